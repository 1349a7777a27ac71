use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Groups services on the public services page ("Cosmetic", "Restorative"…).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    /// Derived from `name` when omitted.
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

const COLUMNS: &str = "id, name, slug, description, display_order, created_at, updated_at";

impl Category {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY display_order ASC, name ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(pool: &SqlitePool, category: &Category) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.display_order)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, category: &Category) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
             SET name = $2, slug = $3, description = $4, display_order = $5, updated_at = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.display_order)
        .bind(category.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
