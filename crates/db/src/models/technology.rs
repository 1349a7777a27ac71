use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Equipment and techniques presented on the technology page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTechnology {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTechnology {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

const COLUMNS: &str =
    "id, name, slug, description, image_url, image_key, display_order, created_at, updated_at";

impl Technology {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technology>(&format!(
            "SELECT {COLUMNS} FROM technologies ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technology>(&format!(
            "SELECT {COLUMNS} FROM technologies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technology>(&format!(
            "SELECT {COLUMNS} FROM technologies WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(pool: &SqlitePool, technology: &Technology) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Technology>(&format!(
            "INSERT INTO technologies ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(technology.id)
        .bind(&technology.name)
        .bind(&technology.slug)
        .bind(&technology.description)
        .bind(&technology.image_url)
        .bind(&technology.image_key)
        .bind(technology.display_order)
        .bind(technology.created_at)
        .bind(technology.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, technology: &Technology) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Technology>(&format!(
            "UPDATE technologies
             SET name = $2, slug = $3, description = $4, image_url = $5, image_key = $6,
                 display_order = $7, updated_at = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(technology.id)
        .bind(&technology.name)
        .bind(&technology.slug)
        .bind(&technology.description)
        .bind(&technology.image_url)
        .bind(&technology.image_key)
        .bind(technology.display_order)
        .bind(technology.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technologies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
