use crate::config::Environment;
use crate::db::test_support::test_db;
use crate::router::AppState;
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;

/// Fresh state backed by a schema-initialised temp database.
pub fn test_state(env: Environment) -> (tempfile::TempDir, AppState) {
    let (dir, db) = test_db();
    (dir, AppState { db, env })
}

pub fn request(method: Method, uri: &str) -> Request {
    let mut req = Request::new(Body::empty());
    *req.method_mut() = method;
    *req.uri_mut() = uri.parse().expect("valid test uri");
    req
}

pub fn get(uri: &str) -> Request {
    request(Method::GET, uri)
}

pub fn body_json(mut resp: Response) -> serde_json::Value {
    let mut bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut bytes)
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
