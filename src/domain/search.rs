// src/domain/search.rs

use crate::domain::property::PropertyRecord;
use crate::domain::zip::ZipCode;
use crate::errors::ServerError;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 500;

/// Columns a search can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    TotalValue,
    LivingArea,
    PricePerSqFt,
    Address,
    City,
    PropertyType,
    BuildingStyle,
}

impl SortField {
    pub fn parse(raw: &str) -> Result<Self, ServerError> {
        match raw {
            "totalValue" => Ok(SortField::TotalValue),
            "livingArea" => Ok(SortField::LivingArea),
            "pricePerSqFt" => Ok(SortField::PricePerSqFt),
            "address" => Ok(SortField::Address),
            "city" => Ok(SortField::City),
            "propertyType" => Ok(SortField::PropertyType),
            "buildingStyle" => Ok(SortField::BuildingStyle),
            other => Err(ServerError::BadRequest(format!(
                "Unsupported sortBy `{other}`"
            ))),
        }
    }

    /// SQL ordering expression(s) for this field. Only ever built from this
    /// fixed list, never from caller input.
    pub fn sql_columns(self) -> &'static [&'static str] {
        match self {
            SortField::TotalValue => &["p.sale_price"],
            SortField::LivingArea => &["p.living_area"],
            SortField::PricePerSqFt => {
                &["CASE WHEN p.living_area > 0 THEN p.sale_price / p.living_area END"]
            }
            SortField::Address => &["p.st_name", "p.st_num"],
            SortField::City => &["p.city"],
            SortField::PropertyType => &["p.lu_desc"],
            SortField::BuildingStyle => &["p.building_style"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, ServerError> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ServerError::BadRequest(format!(
                "sortOrder must be `asc` or `desc`, got `{other}`"
            ))),
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Optional inclusive sale price bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    /// A range whose minimum exceeds its maximum matches nothing. It is not
    /// an error: the filter simply yields an empty page.
    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub zip: ZipCode,
    pub price: PriceRange,
    pub property_type: Option<String>,
    pub building_style: Option<String>,
    pub page: u32,
    pub page_size: u32,
    pub sort: SortField,
    pub order: SortOrder,
}

impl SearchQuery {
    /// First page, default size, most expensive first.
    pub fn for_zip(zip: ZipCode) -> Self {
        Self {
            zip,
            price: PriceRange::default(),
            property_type: None,
            building_style: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortField::TotalValue,
            order: SortOrder::Desc,
        }
    }

    /// Builds a query from decoded query-string parameters.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ServerError> {
        // Parsed untrimmed: padded ZIPs are rejected like on the market route.
        let zip_raw = params
            .get("zipCode")
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ServerError::BadRequest("ZIP code is required".to_string()))?;
        let mut query = Self::for_zip(ZipCode::parse(zip_raw)?);

        query.price = PriceRange {
            min: non_empty(params, "minPrice")
                .map(|v| parse_price("minPrice", v))
                .transpose()?,
            max: non_empty(params, "maxPrice")
                .map(|v| parse_price("maxPrice", v))
                .transpose()?,
        };
        query.property_type = non_empty(params, "propertyType").map(str::to_string);
        query.building_style = non_empty(params, "buildingStyle").map(str::to_string);

        if let Some(page) = non_empty(params, "page") {
            query.page = parse_positive("page", page)?;
        }
        if let Some(size) = non_empty(params, "pageSize") {
            query.page_size = parse_positive("pageSize", size)?;
            if query.page_size > MAX_PAGE_SIZE {
                return Err(ServerError::BadRequest(format!(
                    "pageSize must not exceed {MAX_PAGE_SIZE}"
                )));
            }
        }
        if let Some(sort) = non_empty(params, "sortBy") {
            query.sort = SortField::parse(sort)?;
        }
        if let Some(order) = non_empty(params, "sortOrder") {
            query.order = SortOrder::parse(order)?;
        }

        // Reject pages whose offset cannot be represented.
        query.offset()?;
        Ok(query)
    }

    /// `(page - 1) * page_size`, checked.
    pub fn offset(&self) -> Result<i64, ServerError> {
        if self.page == 0 || self.page_size == 0 {
            return Err(ServerError::BadRequest(
                "page and pageSize must be at least 1".to_string(),
            ));
        }
        i64::from(self.page - 1)
            .checked_mul(i64::from(self.page_size))
            .ok_or_else(|| ServerError::BadRequest("page is out of range".to_string()))
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<PropertyRecord>,
    /// Matching rows regardless of the page window.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_price(name: &str, raw: &str) -> Result<f64, ServerError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("{name} must be a number")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ServerError::BadRequest(format!(
            "{name} must be a non-negative number"
        )));
    }
    Ok(value)
}

fn parse_positive(name: &str, raw: &str) -> Result<u32, ServerError> {
    match raw.parse::<u32>() {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(ServerError::BadRequest(format!(
            "{name} must be a positive integer"
        ))),
    }
}
