use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::expenses::dto::ValidExpense;
use crate::expenses::query::ExpenseFilter;
use crate::ownership::Owned;

/// One expense row. Timestamps are stored as RFC 3339 text and serialized
/// back out the same way.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub description: String,
    pub category_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    pub owner_id: i64,
}

impl Owned for Expense {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

pub async fn create(
    db: &SqlitePool,
    owner_id: i64,
    data: &ValidExpense,
    now: OffsetDateTime,
) -> anyhow::Result<Expense> {
    let expense = sqlx::query_as::<_, Expense>(
        "INSERT INTO expenses (amount, description, category_id, date, last_updated, owner_id) \
         VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, amount, description, category_id, date, last_updated, owner_id",
    )
    .bind(data.amount)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.date.unwrap_or(now))
    .bind(now)
    .bind(owner_id)
    .fetch_one(db)
    .await?;
    Ok(expense)
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Expense>> {
    let expense = sqlx::query_as::<_, Expense>(
        "SELECT id, amount, description, category_id, date, last_updated, owner_id \
         FROM expenses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(expense)
}

/// Full replacement. A missing `date` in the payload resets the expense to
/// the current clock, same as at creation.
pub async fn update(
    db: &SqlitePool,
    id: i64,
    data: &ValidExpense,
    now: OffsetDateTime,
) -> anyhow::Result<Expense> {
    let expense = sqlx::query_as::<_, Expense>(
        "UPDATE expenses \
         SET amount = ?, description = ?, category_id = ?, date = ?, last_updated = ? \
         WHERE id = ? \
         RETURNING id, amount, description, category_id, date, last_updated, owner_id",
    )
    .bind(data.amount)
    .bind(&data.description)
    .bind(data.category_id)
    .bind(data.date.unwrap_or(now))
    .bind(now)
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(expense)
}

pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list(
    db: &SqlitePool,
    owner_id: i64,
    filter: &ExpenseFilter,
) -> anyhow::Result<Vec<Expense>> {
    let mut query = filter.to_query(owner_id);
    let expenses = query.build_query_as::<Expense>().fetch_all(db).await?;
    Ok(expenses)
}
