use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::expenses::query::{report_query, DateRange};

#[derive(Debug, sqlx::FromRow)]
struct CategoryTotal {
    category_id: i64,
    total: f64,
}

/// Sum the caller's expenses per category in a single aggregation pass.
/// Keys are category ids rendered as strings, sorted, so the response body
/// is stable across runs.
pub async fn totals_by_category(
    db: &SqlitePool,
    owner_id: i64,
    range: &DateRange,
) -> anyhow::Result<BTreeMap<String, f64>> {
    let mut query = report_query(owner_id, range);
    let rows = query
        .build_query_as::<CategoryTotal>()
        .fetch_all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.category_id.to_string(), row.total))
        .collect())
}
