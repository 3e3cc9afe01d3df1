use crate::config::Environment;
use crate::errors::ServerError;
use crate::responses::json::{json_response, plain_500};
use astra::Response;
use serde::Serialize;

/// Seconds a client should wait before retrying a 503.
const RETRY_AFTER_SECS: &str = "1";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Client errors carry their validation message. Server-side detail is
    /// only exposed outside production.
    pub fn from_error(err: &ServerError, env: Environment) -> Self {
        match err {
            ServerError::BadRequest(msg) => ErrorBody {
                error: msg.clone(),
                message: None,
            },
            ServerError::NotFound => ErrorBody {
                error: "Not Found".to_string(),
                message: None,
            },
            _ if err.is_retryable() => ErrorBody {
                error: "Service temporarily unavailable".to_string(),
                message: (!env.is_production()).then(|| err.to_string()),
            },
            _ => ErrorBody {
                error: "Internal server error".to_string(),
                message: (!env.is_production()).then(|| err.to_string()),
            },
        }
    }
}

/// Convert a ServerError into a JSON response.
pub fn error_to_response(err: &ServerError, env: Environment) -> Response {
    let status = err.status();
    match json_response(status, &ErrorBody::from_error(err, env)) {
        Ok(mut resp) => {
            if status == 503 {
                if let Ok(value) = RETRY_AFTER_SECS.parse() {
                    resp.headers_mut().insert("Retry-After", value);
                }
            }
            resp
        }
        Err(_) => plain_500(),
    }
}
