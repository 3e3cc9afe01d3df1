//! Chart-ready projection of [`MarketStats`]. Pure reshaping: every number
//! is copied through unchanged.

use crate::domain::market::MarketStats;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
    pub avg_price: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart<T> {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub average_price: i64,
    pub price_per_sq_ft: i64,
    pub total_properties: u64,
    pub total_sales: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketVisualizations {
    pub property_types: Chart<Vec<ChartPoint>>,
    pub building_styles: Chart<Vec<ChartPoint>>,
    pub price_distribution: Chart<PriceStats>,
}

impl From<&MarketStats> for MarketVisualizations {
    fn from(stats: &MarketStats) -> Self {
        let property_types = stats
            .property_types
            .iter()
            .map(|t| ChartPoint {
                label: t.property_type.clone(),
                value: t.count,
                avg_price: t.avg_price,
            })
            .collect();
        let building_styles = stats
            .building_styles
            .iter()
            .map(|s| ChartPoint {
                label: s.style.clone(),
                value: s.count,
                avg_price: s.avg_price,
            })
            .collect();

        MarketVisualizations {
            property_types: Chart {
                kind: ChartKind::Pie,
                data: property_types,
            },
            building_styles: Chart {
                kind: ChartKind::Bar,
                data: building_styles,
            },
            price_distribution: Chart {
                kind: ChartKind::Stats,
                data: PriceStats {
                    average_price: stats.overview.avg_price,
                    price_per_sq_ft: stats.overview.avg_price_per_sq_ft,
                    total_properties: stats.overview.total_properties,
                    total_sales: stats.overview.total_sales,
                },
            },
        }
    }
}

/// Body of `GET /api/market/:zipCode`.
#[derive(Debug, Serialize)]
pub struct MarketResponse<'a> {
    pub success: bool,
    pub data: &'a MarketStats,
    pub visualizations: MarketVisualizations,
}

impl<'a> MarketResponse<'a> {
    pub fn new(stats: &'a MarketStats) -> Self {
        Self {
            success: true,
            data: stats,
            visualizations: MarketVisualizations::from(stats),
        }
    }
}
