use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// A team member shown on the team page.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateMember {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Position is required"))]
    pub position: String,
    pub bio: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Position cannot be empty"))]
    pub position: Option<String>,
    /// An empty string clears the bio.
    pub bio: Option<String>,
    pub display_order: Option<i64>,
}

const COLUMNS: &str =
    "id, name, position, bio, image_url, image_key, display_order, created_at, updated_at";

impl Member {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {COLUMNS} FROM members ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!("SELECT {COLUMNS} FROM members WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert(pool: &SqlitePool, member: &Member) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "INSERT INTO members ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(member.id)
        .bind(&member.name)
        .bind(&member.position)
        .bind(&member.bio)
        .bind(&member.image_url)
        .bind(&member.image_key)
        .bind(member.display_order)
        .bind(member.created_at)
        .bind(member.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, member: &Member) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Member>(&format!(
            "UPDATE members
             SET name = $2, position = $3, bio = $4, image_url = $5, image_key = $6,
                 display_order = $7, updated_at = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(member.id)
        .bind(&member.name)
        .bind(&member.position)
        .bind(&member.bio)
        .bind(&member.image_url)
        .bind(&member.image_key)
        .bind(member.display_order)
        .bind(member.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
