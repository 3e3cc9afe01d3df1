// src/tests/router_tests/health_tests.rs

use crate::config::Environment;
use crate::router::respond;
use crate::tests::utils::{body_json, get, request, test_state};
use http::Method;

#[test]
fn health_reports_ok() {
    let (_dir, state) = test_state(Environment::Development);

    let resp = respond(get("/health"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(
        resp.headers()
            .get("Access-Control-Allow-Origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(body_json(resp), serde_json::json!({ "status": "ok" }));
}

#[test]
fn preflight_is_answered() {
    let (_dir, state) = test_state(Environment::Development);

    let resp = respond(request(Method::OPTIONS, "/api/properties/search"), &state);
    assert_eq!(resp.status(), 204);
    assert!(resp.headers().contains_key("Access-Control-Allow-Methods"));
}

#[test]
fn unknown_routes_and_methods_are_not_found() {
    let (_dir, state) = test_state(Environment::Development);

    for req in [
        get("/api/nothing"),
        get("/api/market/02116/extra/deep"),
        request(Method::POST, "/api/properties/search?zipCode=02116"),
    ] {
        let resp = respond(req, &state);
        assert_eq!(resp.status(), 404);
        assert_eq!(body_json(resp)["error"], "Not Found");
    }
}
