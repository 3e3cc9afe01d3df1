use crate::db::connection::Database;
use crate::db::join_read;
use crate::domain::property::{coerce_number, PropertyRecord, PropertyRow};
use crate::domain::search::{SearchQuery, SearchResult};
use crate::domain::zip::ZipCode;
use crate::errors::ServerError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::thread;
use tracing::{debug, error, warn};

/// WHERE clause plus its bound parameters. The count and the page query are
/// both built from one of these so they always agree on what matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub predicate: String,
    pub params: Vec<Value>,
}

impl SearchFilter {
    pub fn for_query(query: &SearchQuery) -> Self {
        let mut clauses = vec!["p.zip_code = ?".to_string()];
        let mut params = vec![Value::Integer(query.zip.to_storage())];

        if let Some(min) = query.price.min {
            clauses.push("p.sale_price >= ?".to_string());
            params.push(Value::Real(min));
        }
        if let Some(max) = query.price.max {
            clauses.push("p.sale_price <= ?".to_string());
            params.push(Value::Real(max));
        }
        if let Some(label) = &query.property_type {
            clauses.push("p.lu_desc = ?".to_string());
            params.push(Value::Text(label.clone()));
        }
        if let Some(label) = &query.building_style {
            clauses.push("p.building_style = ?".to_string());
            params.push(Value::Text(label.clone()));
        }

        Self {
            predicate: clauses.join(" AND "),
            params,
        }
    }

    fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM property_data p WHERE {}",
            self.predicate
        )
    }

    fn page_sql(&self, query: &SearchQuery) -> String {
        let direction = query.order.sql();
        let mut order_by: Vec<String> = query
            .sort
            .sql_columns()
            .iter()
            .map(|col| format!("{col} {direction}"))
            .collect();
        // Stable pagination when sort keys tie.
        order_by.push("p.rowid ASC".to_string());

        format!(
            r#"
            SELECT
                p.rowid          AS row_id,
                p.st_num         AS st_num,
                p.st_name        AS st_name,
                p.city           AS city,
                p.zip_code       AS zip_code,
                p.sale_price     AS sale_price,
                p.living_area    AS living_area,
                p.lu_desc        AS property_type,
                p.building_style AS building_style,
                NULL             AS bedrooms,
                NULL             AS bathrooms,
                NULL             AS year_built,
                NULL             AS taxes
            FROM property_data p
            WHERE {}
            ORDER BY {}
            LIMIT ? OFFSET ?
            "#,
            self.predicate,
            order_by.join(", ")
        )
    }
}

/// Runs a paginated property search. The total count and the requested page
/// are read concurrently on separate pooled connections.
pub fn search_properties(db: &Database, query: &SearchQuery) -> Result<SearchResult, ServerError> {
    let offset = query.offset()?;
    let filter = SearchFilter::for_query(query);
    debug!(zip = %query.zip, predicate = %filter.predicate, offset, "searching properties");
    if query.price.is_empty() {
        debug!(zip = %query.zip, "minPrice exceeds maxPrice, no rows can match");
    }

    let (total, items) = thread::scope(|s| {
        let count = s.spawn(|| db.with_conn(|conn| count_matches(conn, &filter)));
        let page = db.with_conn(|conn| fetch_page(conn, &filter, query, offset));
        let total = join_read(count, "property count");
        Ok::<_, ServerError>((total?, page?))
    })
    .map_err(|e| {
        error!(
            zip = %query.zip,
            min_price = ?query.price.min,
            max_price = ?query.price.max,
            page = query.page,
            page_size = query.page_size,
            error = %e,
            "property search failed"
        );
        e
    })?;

    debug!(zip = %query.zip, total, returned = items.len(), "property search complete");
    Ok(SearchResult {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
    })
}

fn count_matches(conn: &Connection, filter: &SearchFilter) -> Result<u64, ServerError> {
    let count: i64 = conn.query_row(
        &filter.count_sql(),
        params_from_iter(filter.params.iter()),
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or(0))
}

fn fetch_page(
    conn: &Connection,
    filter: &SearchFilter,
    query: &SearchQuery,
    offset: i64,
) -> Result<Vec<PropertyRecord>, ServerError> {
    let mut stmt = conn.prepare(&filter.page_sql(query))?;

    let mut params = filter.params.clone();
    params.push(Value::Integer(i64::from(query.page_size)));
    params.push(Value::Integer(offset));

    let rows = stmt.query_map(params_from_iter(params.iter()), read_property_row)?;

    let mut items = Vec::new();
    for row in rows {
        items.push(PropertyRecord::from_row(row?)?);
    }
    Ok(items)
}

fn read_property_row(row: &Row<'_>) -> rusqlite::Result<PropertyRow> {
    Ok(PropertyRow {
        row_id: row.get("row_id")?,
        st_num: row.get("st_num")?,
        st_name: row.get("st_name")?,
        city: row.get("city")?,
        zip_code: row.get("zip_code")?,
        sale_price: row.get("sale_price")?,
        living_area: row.get("living_area")?,
        property_type: row.get("property_type")?,
        building_style: row.get("building_style")?,
        bedrooms: row.get("bedrooms")?,
        bathrooms: row.get("bathrooms")?,
        year_built: row.get("year_built")?,
        taxes: row.get("taxes")?,
    })
}

/// Every ZIP code with at least one record, ascending.
pub fn list_zip_codes(db: &Database) -> Result<Vec<ZipCode>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT zip_code
            FROM property_data
            WHERE zip_code IS NOT NULL
            ORDER BY zip_code
            "#,
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, Value>(0))?;

        let mut zips = Vec::new();
        for raw in rows {
            let raw = raw?;
            match coerce_number(&raw).map(|n| ZipCode::from_storage(n.round() as i64)) {
                Some(Ok(zip)) => zips.push(zip),
                _ => warn!(value = ?raw, "skipping unusable zip_code in property_data"),
            }
        }
        // Mixed INTEGER/REAL/TEXT storage can sort or repeat oddly in SQL.
        zips.sort();
        zips.dedup();
        Ok(zips)
    })
}
