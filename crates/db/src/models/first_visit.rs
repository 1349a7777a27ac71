use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// The "your first visit" page. At most one row exists; the unique
/// `singleton_key` column enforces it in the store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FirstVisit {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpsertFirstVisit {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

const COLUMNS: &str = "id, title, description, image_url, image_key, created_at, updated_at";

impl FirstVisit {
    pub async fn find(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FirstVisit>(&format!(
            "SELECT {COLUMNS} FROM first_visit WHERE singleton_key = 1"
        ))
        .fetch_optional(pool)
        .await
    }

    /// Inserts `page` or, when the row already exists, overwrites its content
    /// while keeping the original id and `created_at`.
    pub async fn upsert(pool: &SqlitePool, page: &FirstVisit) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, FirstVisit>(&format!(
            "INSERT INTO first_visit (singleton_key, {COLUMNS})
             VALUES (1, $1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT(singleton_key) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 image_url = excluded.image_url,
                 image_key = excluded.image_key,
                 updated_at = excluded.updated_at
             RETURNING {COLUMNS}"
        ))
        .bind(page.id)
        .bind(&page.title)
        .bind(&page.description)
        .bind(&page.image_url)
        .bind(&page.image_key)
        .bind(page.created_at)
        .bind(page.updated_at)
        .fetch_one(pool)
        .await
    }
}
