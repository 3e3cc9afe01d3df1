use crate::db::connection::Database;
use crate::db::join_read;
use crate::domain::market::{
    count_value, round_average, LabelGroup, MarketStats, Overview, TrendMetrics, ZipMarketMetrics,
};
use crate::domain::zip::ZipCode;
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};
use std::thread;
use tracing::{debug, error};

const OVERVIEW_SQL: &str = r#"
    SELECT
        COUNT(*)                                   AS total_properties,
        AVG(sale_price)                            AS avg_price,
        AVG(sale_price_per_sf)                     AS avg_price_per_sqft,
        COUNT(CASE WHEN sale_price > 0 THEN 1 END) AS total_sales
    FROM property_data
    WHERE zip_code = ?1
"#;

// Ties in count are broken by label so the order never depends on the engine.
const PROPERTY_TYPES_SQL: &str = r#"
    SELECT lu_desc AS label, COUNT(*) AS label_count, AVG(sale_price) AS avg_price
    FROM property_data
    WHERE zip_code = ?1 AND lu_desc IS NOT NULL AND TRIM(lu_desc) <> ''
    GROUP BY lu_desc
    ORDER BY label_count DESC, label ASC
"#;

const BUILDING_STYLES_SQL: &str = r#"
    SELECT building_style AS label, COUNT(*) AS label_count, AVG(sale_price) AS avg_price
    FROM property_data
    WHERE zip_code = ?1 AND building_style IS NOT NULL AND TRIM(building_style) <> ''
    GROUP BY building_style
    ORDER BY label_count DESC, label ASC
"#;

/// Overview plus property-type and building-style breakdowns for one ZIP.
///
/// The three aggregates are independent reads and run concurrently. A ZIP
/// with no records yields a zero overview and empty breakdowns.
pub fn market_stats(db: &Database, zip: ZipCode) -> Result<MarketStats, ServerError> {
    let storage_zip = zip.to_storage();

    let stats = thread::scope(|s| {
        let types = s.spawn(|| {
            db.with_conn(|conn| label_breakdown(conn, PROPERTY_TYPES_SQL, storage_zip))
        });
        let styles = s.spawn(|| {
            db.with_conn(|conn| label_breakdown(conn, BUILDING_STYLES_SQL, storage_zip))
        });
        let overview = db.with_conn(|conn| overview(conn, storage_zip));
        let types = join_read(types, "property type breakdown");
        let styles = join_read(styles, "building style breakdown");

        Ok::<_, ServerError>(MarketStats {
            zip_code: zip,
            overview: overview?,
            property_types: types?.into_iter().map(Into::into).collect(),
            building_styles: styles?.into_iter().map(Into::into).collect(),
        })
    })
    .map_err(|e| {
        error!(zip = %zip, error = %e, "market aggregation failed");
        e
    })?;

    debug!(
        zip = %zip,
        total = stats.overview.total_properties,
        types = stats.property_types.len(),
        styles = stats.building_styles.len(),
        "market aggregation complete"
    );
    Ok(stats)
}

fn overview(conn: &Connection, storage_zip: i64) -> Result<Overview, ServerError> {
    // Aggregates without GROUP BY always yield exactly one row.
    let overview = conn.query_row(OVERVIEW_SQL, params![storage_zip], |row| {
        Ok(Overview {
            total_properties: count_value(row.get("total_properties")?),
            avg_price: round_average(row.get("avg_price")?),
            avg_price_per_sq_ft: round_average(row.get("avg_price_per_sqft")?),
            total_sales: count_value(row.get("total_sales")?),
        })
    })?;
    Ok(overview)
}

fn label_breakdown(
    conn: &Connection,
    sql: &str,
    storage_zip: i64,
) -> Result<Vec<LabelGroup>, ServerError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![storage_zip], |row| {
        Ok(LabelGroup {
            label: row.get("label")?,
            count: count_value(row.get("label_count")?),
            avg_price: round_average(row.get("avg_price")?),
        })
    })?;

    let mut groups = Vec::new();
    for group in rows {
        groups.push(group?);
    }
    Ok(groups)
}

/// Trend metrics from `zip_code_data`, if the ZIP has a row there.
pub fn zip_market_metrics(
    db: &Database,
    zip: ZipCode,
) -> Result<Option<ZipMarketMetrics>, ServerError> {
    db.with_conn(|conn| {
        let metrics = conn
            .query_row(
                r#"
                SELECT
                    regionid_x,
                    avg_sale_to_list,
                    avg_sale_to_list_mom,
                    avg_sale_to_list_yoy,
                    sold_above_list,
                    sold_above_list_mom,
                    sold_above_list_yoy,
                    off_market_in_two_weeks,
                    off_market_in_two_weeks_mom,
                    off_market_in_two_weeks_yoy,
                    parent_metro_region_metro_code
                FROM zip_code_data
                WHERE region = ?1
                LIMIT 1
                "#,
                params![zip.to_storage()],
                |row| {
                    let metric = |name: &str| -> rusqlite::Result<f64> {
                        Ok(row.get::<_, Option<f64>>(name)?.unwrap_or(0.0))
                    };
                    Ok(ZipMarketMetrics {
                        region_id: row.get("regionid_x")?,
                        zip_code: zip,
                        metrics: TrendMetrics {
                            avg_sale_to_list: metric("avg_sale_to_list")?,
                            avg_sale_to_list_mom: metric("avg_sale_to_list_mom")?,
                            avg_sale_to_list_yoy: metric("avg_sale_to_list_yoy")?,
                            sold_above_list: metric("sold_above_list")?,
                            sold_above_list_mom: metric("sold_above_list_mom")?,
                            sold_above_list_yoy: metric("sold_above_list_yoy")?,
                            off_market_in_two_weeks: metric("off_market_in_two_weeks")?,
                            off_market_in_two_weeks_mom: metric("off_market_in_two_weeks_mom")?,
                            off_market_in_two_weeks_yoy: metric("off_market_in_two_weeks_yoy")?,
                        },
                        parent_metro_code: row.get("parent_metro_region_metro_code")?,
                    })
                },
            )
            .optional()?;
        Ok(metrics)
    })
}
