use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct HomepageSettings {
    pub id: Uuid,
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    pub hero_image_url: Option<String>,
    pub hero_image_key: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpsertHomepageSettings {
    #[validate(length(min = 1, max = 200, message = "Hero title is required"))]
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
}

const COLUMNS: &str = "id, hero_title, hero_subtitle, hero_image_url, hero_image_key, phone, \
                       email, address, opening_hours, created_at, updated_at";

impl HomepageSettings {
    pub async fn find(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, HomepageSettings>(&format!(
            "SELECT {COLUMNS} FROM homepage_settings WHERE singleton_key = 1"
        ))
        .fetch_optional(pool)
        .await
    }

    pub async fn upsert(
        pool: &SqlitePool,
        settings: &HomepageSettings,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, HomepageSettings>(&format!(
            "INSERT INTO homepage_settings (singleton_key, {COLUMNS})
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT(singleton_key) DO UPDATE SET
                 hero_title = excluded.hero_title,
                 hero_subtitle = excluded.hero_subtitle,
                 hero_image_url = excluded.hero_image_url,
                 hero_image_key = excluded.hero_image_key,
                 phone = excluded.phone,
                 email = excluded.email,
                 address = excluded.address,
                 opening_hours = excluded.opening_hours,
                 updated_at = excluded.updated_at
             RETURNING {COLUMNS}"
        ))
        .bind(settings.id)
        .bind(&settings.hero_title)
        .bind(&settings.hero_subtitle)
        .bind(&settings.hero_image_url)
        .bind(&settings.hero_image_key)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.address)
        .bind(&settings.opening_hours)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .fetch_one(pool)
        .await
    }
}
