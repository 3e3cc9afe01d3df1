// src/domain/property.rs

use crate::domain::zip::ZipCode;
use crate::errors::ServerError;
use rusqlite::types::Value;
use serde::Serialize;

/// A `property_data` row exactly as the store hands it back.
///
/// Numeric columns are kept as raw SQLite values because the table is fed by
/// an external loader and is not strict about types; all coercion happens in
/// [`PropertyRecord::from_row`].
#[derive(Debug, Clone)]
pub struct PropertyRow {
    pub row_id: i64,
    pub st_num: Value,
    pub st_name: Option<String>,
    pub city: Option<String>,
    pub zip_code: Value,
    pub sale_price: Value,
    pub living_area: Value,
    pub property_type: Option<String>,
    pub building_style: Option<String>,
    // Not present in the store; the query selects NULL in their place.
    pub bedrooms: Value,
    pub bathrooms: Value,
    pub year_built: Value,
    pub taxes: Value,
}

/// A property as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    pub address: String,
    pub city: String,
    pub zip_code: ZipCode,
    pub total_value: f64,
    pub living_area: f64,
    pub price_per_sq_ft: Option<i64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub year_built: Option<f64>,
    pub property_type: Option<String>,
    pub building_style: Option<String>,
    pub taxes: Option<f64>,
}

impl PropertyRecord {
    /// The single mapping from store rows to API records. Every leniency
    /// rule for malformed or missing values lives here.
    pub fn from_row(row: PropertyRow) -> Result<Self, ServerError> {
        let zip_value = coerce_number(&row.zip_code).ok_or_else(|| {
            ServerError::Internal(format!("row {} has no numeric zip_code", row.row_id))
        })?;
        let zip_code = ZipCode::from_storage(zip_value.round() as i64)?;

        let total_value = coerce_number(&row.sale_price).unwrap_or(0.0);
        let living_area = coerce_number(&row.living_area).unwrap_or(0.0);

        Ok(PropertyRecord {
            id: row.row_id.to_string(),
            address: format_address(&row.st_num, row.st_name.as_deref()),
            city: row.city.unwrap_or_default(),
            zip_code,
            total_value,
            living_area,
            price_per_sq_ft: price_per_sq_ft(total_value, living_area),
            bedrooms: absent_attribute(&row.bedrooms),
            bathrooms: absent_attribute(&row.bathrooms),
            year_built: absent_attribute(&row.year_built),
            property_type: non_blank(row.property_type),
            building_style: non_blank(row.building_style),
            taxes: absent_attribute(&row.taxes),
        })
    }
}

/// `round(price / area)`, or `None` when there is no usable living area.
pub fn price_per_sq_ft(price: f64, living_area: f64) -> Option<i64> {
    if !(living_area > 0.0) || !price.is_finite() {
        return None;
    }
    let ratio = (price / living_area).round();
    ratio.is_finite().then_some(ratio as i64)
}

/// Reads a loosely typed numeric column. Text is parsed; NULL, blobs and
/// unparseable text have no value.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) if f.is_finite() => Some(*f),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Like [`coerce_number`], but the store's `"0"` placeholder also means
/// "no value" instead of the number zero.
pub fn absent_attribute(value: &Value) -> Option<f64> {
    if let Value::Text(s) = value {
        if s.trim() == "0" {
            return None;
        }
    }
    coerce_number(value)
}

fn format_address(st_num: &Value, st_name: Option<&str>) -> String {
    let number = coerce_number(st_num).map(|n| (n.trunc() as i64).to_string());
    let name = st_name.map(str::trim).filter(|s| !s.is_empty());
    match (number, name) {
        (Some(n), Some(s)) => format!("{n} {s}"),
        (Some(n), None) => n,
        (None, Some(s)) => s.to_string(),
        (None, None) => String::new(),
    }
}

fn non_blank(label: Option<String>) -> Option<String> {
    label.filter(|s| !s.trim().is_empty())
}
