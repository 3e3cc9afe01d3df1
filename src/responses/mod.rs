pub mod errors;
pub mod json;
pub mod visualization;

pub use errors::error_to_response;
pub use json::{json_ok, preflight_response};
