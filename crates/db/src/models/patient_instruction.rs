use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Pre- and post-treatment instructions, optionally with a printable PDF.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PatientInstruction {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// HTML body.
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_key: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePatientInstruction {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientInstruction {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,
    pub display_order: Option<i64>,
}

const COLUMNS: &str = "id, title, slug, content, attachment_url, attachment_key, display_order, \
                       created_at, updated_at";

impl PatientInstruction {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PatientInstruction>(&format!(
            "SELECT {COLUMNS} FROM patient_instructions ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PatientInstruction>(&format!(
            "SELECT {COLUMNS} FROM patient_instructions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PatientInstruction>(&format!(
            "SELECT {COLUMNS} FROM patient_instructions WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(
        pool: &SqlitePool,
        instruction: &PatientInstruction,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PatientInstruction>(&format!(
            "INSERT INTO patient_instructions ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(instruction.id)
        .bind(&instruction.title)
        .bind(&instruction.slug)
        .bind(&instruction.content)
        .bind(&instruction.attachment_url)
        .bind(&instruction.attachment_key)
        .bind(instruction.display_order)
        .bind(instruction.created_at)
        .bind(instruction.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        instruction: &PatientInstruction,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PatientInstruction>(&format!(
            "UPDATE patient_instructions
             SET title = $2, slug = $3, content = $4, attachment_url = $5, attachment_key = $6,
                 display_order = $7, updated_at = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(instruction.id)
        .bind(&instruction.title)
        .bind(&instruction.slug)
        .bind(&instruction.content)
        .bind(&instruction.attachment_url)
        .bind(&instruction.attachment_key)
        .bind(instruction.display_order)
        .bind(instruction.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM patient_instructions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
