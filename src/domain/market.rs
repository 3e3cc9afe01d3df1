// src/domain/market.rs

use crate::domain::zip::ZipCode;
use serde::Serialize;

/// Aggregate statistics for every sale record in one ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub zip_code: ZipCode,
    pub overview: Overview,
    pub property_types: Vec<PropertyTypeCount>,
    pub building_styles: Vec<BuildingStyleCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_properties: u64,
    pub avg_price: i64,
    pub avg_price_per_sq_ft: i64,
    /// Records with a sale price above zero.
    pub total_sales: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeCount {
    #[serde(rename = "type")]
    pub property_type: String,
    pub count: u64,
    pub avg_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingStyleCount {
    pub style: String,
    pub count: u64,
    pub avg_price: i64,
}

/// A grouped row before it is labelled as a type or a style.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGroup {
    pub label: String,
    pub count: u64,
    pub avg_price: i64,
}

impl From<LabelGroup> for PropertyTypeCount {
    fn from(g: LabelGroup) -> Self {
        Self {
            property_type: g.label,
            count: g.count,
            avg_price: g.avg_price,
        }
    }
}

impl From<LabelGroup> for BuildingStyleCount {
    fn from(g: LabelGroup) -> Self {
        Self {
            style: g.label,
            count: g.count,
            avg_price: g.avg_price,
        }
    }
}

/// Market trend metrics for one ZIP code, from `zip_code_data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipMarketMetrics {
    pub region_id: Option<i64>,
    pub zip_code: ZipCode,
    pub metrics: TrendMetrics,
    pub parent_metro_code: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetrics {
    pub avg_sale_to_list: f64,
    #[serde(rename = "avgSaleToListMoM")]
    pub avg_sale_to_list_mom: f64,
    #[serde(rename = "avgSaleToListYoY")]
    pub avg_sale_to_list_yoy: f64,
    pub sold_above_list: f64,
    #[serde(rename = "soldAboveListMoM")]
    pub sold_above_list_mom: f64,
    #[serde(rename = "soldAboveListYoY")]
    pub sold_above_list_yoy: f64,
    pub off_market_in_two_weeks: f64,
    #[serde(rename = "offMarketInTwoWeeksMoM")]
    pub off_market_in_two_weeks_mom: f64,
    #[serde(rename = "offMarketInTwoWeeksYoY")]
    pub off_market_in_two_weeks_yoy: f64,
}

/// Rounds an SQL `AVG` for display. No rows (NULL) reads as zero.
pub fn round_average(avg: Option<f64>) -> i64 {
    match avg {
        Some(v) if v.is_finite() => v.round() as i64,
        _ => 0,
    }
}

/// SQL `COUNT` values are never negative; anything else reads as zero.
pub fn count_value(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}
