// src/domain/zip.rs

use crate::errors::ServerError;
use std::fmt;

/// Largest value a 5-digit ZIP code can take in storage form.
const MAX_STORAGE_ZIP: i64 = 99_999;

/// A validated 5-digit US ZIP code.
///
/// The store keeps ZIP codes as numbers with the leading zeros stripped
/// (`2114`), while callers always see the zero-padded display form
/// (`"02114"`). This type is the only place the two forms are converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZipCode(u32);

impl ZipCode {
    /// Parses the display form. Anything other than exactly five ASCII
    /// digits is rejected rather than coerced.
    pub fn parse(raw: &str) -> Result<Self, ServerError> {
        if raw.len() != 5 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ServerError::BadRequest(
                "Valid 5-digit ZIP code is required".to_string(),
            ));
        }
        // Five ASCII digits always fit in a u32.
        let value = raw
            .parse::<u32>()
            .map_err(|e| ServerError::BadRequest(format!("Invalid ZIP code: {e}")))?;
        Ok(Self(value))
    }

    /// Builds a ZIP code from the numeric storage form.
    pub fn from_storage(value: i64) -> Result<Self, ServerError> {
        if !(0..=MAX_STORAGE_ZIP).contains(&value) {
            return Err(ServerError::Internal(format!(
                "stored ZIP code {value} does not fit in 5 digits"
            )));
        }
        Ok(Self(value as u32))
    }

    /// Numeric form used for every query against the store.
    pub fn to_storage(self) -> i64 {
        i64::from(self.0)
    }

    pub fn to_display(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl serde::Serialize for ZipCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
