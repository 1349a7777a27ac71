use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// A treatment offered by the clinic, shown on `/services` and `/services/{slug}`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ClinicService {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    /// HTML body.
    pub description: String,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub display_order: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateClinicService {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub summary: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub display_order: Option<i64>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClinicService {
    pub category_id: Option<Uuid>,
    /// Detaches the service from its category; wins over `category_id`.
    #[serde(default)]
    pub clear_category: bool,
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub summary: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub display_order: Option<i64>,
    pub is_published: Option<bool>,
}

const COLUMNS: &str = "id, category_id, title, slug, summary, description, image_url, image_key, \
                       display_order, is_published, created_at, updated_at";

impl ClinicService {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "SELECT {COLUMNS} FROM clinic_services ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_published(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "SELECT {COLUMNS} FROM clinic_services
             WHERE is_published = 1
             ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_category(
        pool: &SqlitePool,
        category_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "SELECT {COLUMNS} FROM clinic_services
             WHERE category_id = $1
             ORDER BY display_order ASC, created_at ASC"
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "SELECT {COLUMNS} FROM clinic_services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "SELECT {COLUMNS} FROM clinic_services WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(pool: &SqlitePool, service: &ClinicService) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "INSERT INTO clinic_services ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        ))
        .bind(service.id)
        .bind(service.category_id)
        .bind(&service.title)
        .bind(&service.slug)
        .bind(&service.summary)
        .bind(&service.description)
        .bind(&service.image_url)
        .bind(&service.image_key)
        .bind(service.display_order)
        .bind(service.is_published)
        .bind(service.created_at)
        .bind(service.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, service: &ClinicService) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ClinicService>(&format!(
            "UPDATE clinic_services
             SET category_id = $2, title = $3, slug = $4, summary = $5, description = $6,
                 image_url = $7, image_key = $8, display_order = $9, is_published = $10,
                 updated_at = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(service.id)
        .bind(service.category_id)
        .bind(&service.title)
        .bind(&service.slug)
        .bind(&service.summary)
        .bind(&service.description)
        .bind(&service.image_url)
        .bind(&service.image_key)
        .bind(service.display_order)
        .bind(service.is_published)
        .bind(service.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clinic_services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
