pub mod connection;
pub mod market;
pub mod properties;

pub use connection::{init_db, Database, SCHEMA_SQL};
pub use market::{market_stats, zip_market_metrics};
pub use properties::{list_zip_codes, search_properties};

use crate::errors::ServerError;
use std::thread::ScopedJoinHandle;

/// Waits for a read running on a scoped thread. A panic in the reader is
/// reported as an internal error rather than taking the worker down.
pub(crate) fn join_read<T>(
    handle: ScopedJoinHandle<'_, Result<T, ServerError>>,
    what: &str,
) -> Result<T, ServerError> {
    handle
        .join()
        .map_err(|_| ServerError::Internal(format!("{what} query panicked")))?
}
