// errors.rs
use astra::Response;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, validation, etc.) or downstream layers (DB, pool, config).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Database Error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection Pool Error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    /// True when the caller may reasonably try the same request again:
    /// a pool checkout timed out or SQLite reported the file busy/locked.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServerError::Pool(_) => true,
            ServerError::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            _ if self.is_retryable() => 503,
            _ => 500,
        }
    }
}
