use crate::config::Environment;
use crate::db::{self, Database};
use crate::domain::search::SearchQuery;
use crate::domain::zip::ZipCode;
use crate::errors::{ResultResp, ServerError};
use crate::responses::visualization::MarketResponse;
use crate::responses::{error_to_response, json_ok, preflight_response};
use astra::{Request, Response};
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, info, warn};

/// Everything a request handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub env: Environment,
}

/// Entry point for the server: routes the request, turns errors into JSON
/// responses and logs the outcome.
pub fn respond(req: Request, state: &AppState) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    let resp = match handle(req, state) {
        Ok(resp) => resp,
        Err(err) => {
            match err.status() {
                500..=599 => error!(%method, %path, error = %err, "request failed"),
                _ => warn!(%method, %path, error = %err, "request rejected"),
            }
            error_to_response(&err, state.env)
        }
    };

    info!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        db_in_use = state.db.connections_in_use(),
        "request handled"
    );
    resp
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    if method == "OPTIONS" {
        return preflight_response();
    }
    if method != "GET" {
        return Err(ServerError::NotFound);
    }

    match path {
        "/health" => json_ok(&json!({ "status": "ok" })),
        "/api/properties/search" => {
            let params = parse_query(&req);
            search(&state.db, &params)
        }
        "/api/properties/zip-codes" => {
            let zips: Vec<String> = db::list_zip_codes(&state.db)?
                .into_iter()
                .map(ZipCode::to_display)
                .collect();
            json_ok(&zips)
        }
        _ => match path.strip_prefix("/api/market/") {
            Some(rest) => market_route(&state.db, rest),
            None => Err(ServerError::NotFound),
        },
    }
}

fn search(db: &Database, params: &HashMap<String, String>) -> ResultResp {
    let query = SearchQuery::from_params(params)?;
    info!(
        zip = %query.zip,
        min_price = ?query.price.min,
        max_price = ?query.price.max,
        page = query.page,
        page_size = query.page_size,
        "property search"
    );
    let result = db::search_properties(db, &query)?;
    json_ok(&result)
}

/// `/api/market/:zipCode` and `/api/market/:zipCode/metrics`.
fn market_route(db: &Database, rest: &str) -> ResultResp {
    match rest.split('/').collect::<Vec<_>>().as_slice() {
        [zip] => {
            let zip = ZipCode::parse(zip)?;
            let stats = db::market_stats(db, zip)?;
            json_ok(&MarketResponse::new(&stats))
        }
        [zip, "metrics"] => {
            let zip = ZipCode::parse(zip)?;
            let metrics = db::zip_market_metrics(db, zip)?.ok_or(ServerError::NotFound)?;
            json_ok(&json!({ "success": true, "data": metrics }))
        }
        _ => Err(ServerError::NotFound),
    }
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
