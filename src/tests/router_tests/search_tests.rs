// src/tests/router_tests/search_tests.rs

use crate::config::Environment;
use crate::db::test_support::{seed_property, PropertySeed};
use crate::db::{init_db, Database, SCHEMA_SQL};
use crate::router::{respond, AppState};
use crate::tests::utils::{body_json, get, test_state};
use std::time::Duration;

#[test]
fn search_filters_by_price_and_reports_full_total() {
    let (_dir, state) = test_state(Environment::Development);
    let prices = [
        120_000.0, 480_000.0, 500_000.0, 750_000.0, 1_100_000.0, 2_600_000.0, 5_000_000.0,
        5_000_001.0, 9_000_000.0,
    ];
    for (i, price) in prices.into_iter().enumerate() {
        seed_property(
            &state.db,
            PropertySeed {
                st_num: i as i64 + 10,
                st_name: "Commonwealth Ave",
                zip: 2116,
                price: Some(price),
                ..PropertySeed::default()
            },
        );
    }
    seed_property(&state.db, PropertySeed { zip: 2114, price: Some(900_000.0), ..PropertySeed::default() });

    let resp = respond(
        get("/api/properties/search?zipCode=02116&minPrice=500000&maxPrice=5000000&page=1&pageSize=50"),
        &state,
    );
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);

    let items = body["items"].as_array().unwrap();
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 50);
    assert_eq!(items.len(), 5);
    for item in items {
        let value = item["totalValue"].as_f64().unwrap();
        assert!((500_000.0..=5_000_000.0).contains(&value), "{value} out of range");
        assert_eq!(item["zipCode"], "02116");
        assert!(item["bedrooms"].is_null());
        assert!(item["yearBuilt"].is_null());
    }
    assert_eq!(items[0]["totalValue"].as_f64(), Some(5_000_000.0));
    assert!(items[0]["address"].as_str().unwrap().ends_with("Commonwealth Ave"));
}

#[test]
fn page_past_the_end_is_empty_with_total() {
    let (_dir, state) = test_state(Environment::Development);
    for _ in 0..4 {
        seed_property(&state.db, PropertySeed::default());
    }

    let body = body_json(respond(
        get("/api/properties/search?zipCode=02116&page=9&pageSize=2"),
        &state,
    ));
    assert_eq!(body["total"], 4);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["page"], 9);
}

#[test]
fn page_size_bounds_items() {
    let (_dir, state) = test_state(Environment::Development);
    for _ in 0..5 {
        seed_property(&state.db, PropertySeed::default());
    }

    for (page, expected) in [(1, 2), (2, 2), (3, 1), (4, 0)] {
        let body = body_json(respond(
            get(&format!("/api/properties/search?zipCode=02116&page={page}&pageSize=2")),
            &state,
        ));
        let len = body["items"].as_array().unwrap().len();
        assert_eq!(len, expected, "page {page}");
        assert!(len <= 2);
        assert!(body["total"].as_u64().unwrap() >= len as u64);
    }
}

#[test]
fn search_rejects_missing_or_malformed_params() {
    let (_dir, state) = test_state(Environment::Production);

    for uri in [
        "/api/properties/search",
        "/api/properties/search?zipCode=",
        "/api/properties/search?zipCode=2116",
        "/api/properties/search?zipCode=%2002116",
        "/api/properties/search?zipCode=%2002116%20",
        "/api/properties/search?zipCode=+02116",
        "/api/properties/search?zipCode=ABCDE",
        "/api/properties/search?zipCode=02116&minPrice=-5",
        "/api/properties/search?zipCode=02116&page=0",
        "/api/properties/search?zipCode=02116&pageSize=abc",
        "/api/properties/search?zipCode=02116&sortBy=bedrooms",
    ] {
        let resp = respond(get(uri), &state);
        assert_eq!(resp.status(), 400, "{uri}");
        let body = body_json(resp);
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{uri}");
    }
}

#[test]
fn encoded_query_values_are_decoded() {
    let (_dir, state) = test_state(Environment::Development);
    seed_property(
        &state.db,
        PropertySeed {
            property_type: Some("Two Family"),
            ..PropertySeed::default()
        },
    );
    seed_property(&state.db, PropertySeed::default());

    let body = body_json(respond(
        get("/api/properties/search?zipCode=02116&propertyType=Two%20Family"),
        &state,
    ));
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["propertyType"], "Two Family");
}

#[test]
fn zip_codes_are_listed_zero_padded() {
    let (_dir, state) = test_state(Environment::Development);
    for zip in [2116, 2114, 501] {
        seed_property(&state.db, PropertySeed { zip, ..PropertySeed::default() });
    }

    let resp = respond(get("/api/properties/zip-codes"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(
        body_json(resp),
        serde_json::json!(["00501", "02114", "02116"])
    );
}

#[test]
fn exhausted_pool_answers_503_with_retry_after() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_path(
        &dir.path().join("busy.sqlite3"),
        3,
        Duration::from_millis(200),
        Duration::from_millis(100),
    )
    .unwrap();
    init_db(&db, SCHEMA_SQL).unwrap();
    let state = AppState {
        db: db.clone(),
        env: Environment::Production,
    };

    // Every pooled connection is checked out while the request runs.
    let resp = db
        .with_conn(|_| {
            db.with_conn(|_| db.with_conn(|_| Ok(respond(get("/api/properties/zip-codes"), &state))))
        })
        .unwrap();
    assert_eq!(resp.status(), 503);
    assert_eq!(resp.headers().get("Retry-After").unwrap(), "1");
    let body = body_json(resp);
    assert_eq!(body["error"], "Service temporarily unavailable");
    assert!(body.get("message").is_none());

    assert_eq!(db.connections_in_use(), 0);
    let resp = respond(get("/api/properties/zip-codes"), &state);
    assert_eq!(resp.status(), 200);
}
