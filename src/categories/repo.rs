use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A spending category. Categories are shared across users; expenses point
/// at them by id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub description: String,
}

pub async fn create(db: &SqlitePool, description: &str) -> anyhow::Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (description) VALUES (?) RETURNING id, description",
    )
    .bind(description)
    .fetch_one(db)
    .await?;
    Ok(category)
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Category>> {
    let category =
        sqlx::query_as::<_, Category>("SELECT id, description FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(category)
}

pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<Category>> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, description FROM categories ORDER BY id")
            .fetch_all(db)
            .await?;
    Ok(categories)
}
