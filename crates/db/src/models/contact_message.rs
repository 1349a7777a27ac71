use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// A message left through the public contact form.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateContactMessage {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

const COLUMNS: &str = "id, name, email, phone, message, is_read, created_at";

impl ContactMessage {
    /// Newest first.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {COLUMNS} FROM contact_messages ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {COLUMNS} FROM contact_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateContactMessage,
        id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "INSERT INTO contact_messages (id, name, email, phone, message, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, 0, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.name.trim())
        .bind(data.email.trim())
        .bind(data.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()))
        .bind(data.message.trim())
        .bind(created_at)
        .fetch_one(pool)
        .await
    }

    pub async fn set_read(
        pool: &SqlitePool,
        id: Uuid,
        is_read: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "UPDATE contact_messages SET is_read = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(is_read)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_unread(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE is_read = 0")
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use validator::Validate;

    use super::*;
    use crate::DBService;

    fn message(name: &str) -> CreateContactMessage {
        CreateContactMessage {
            name: name.to_string(),
            email: "patient@example.com".to_string(),
            phone: Some("  ".to_string()),
            message: "Do you accept new patients?".to_string(),
        }
    }

    #[test]
    fn rejects_invalid_email() {
        let mut data = message("Ana");
        data.email = "not-an-email".to_string();
        assert!(data.validate().is_err());
        assert!(message("Ana").validate().is_ok());
    }

    #[tokio::test]
    async fn lists_newest_first_and_tracks_unread() {
        let db = DBService::new_in_memory().await.unwrap();
        let now = Utc::now();
        let older = ContactMessage::create(&db.pool, &message("Older"), Uuid::new_v4(), now)
            .await
            .unwrap();
        let newer = ContactMessage::create(
            &db.pool,
            &message("Newer"),
            Uuid::new_v4(),
            now + Duration::seconds(5),
        )
        .await
        .unwrap();
        assert_eq!(older.phone, None);

        let all = ContactMessage::find_all(&db.pool).await.unwrap();
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
        assert_eq!(ContactMessage::count_unread(&db.pool).await.unwrap(), 2);

        let read = ContactMessage::set_read(&db.pool, older.id, true)
            .await
            .unwrap()
            .unwrap();
        assert!(read.is_read);
        assert_eq!(ContactMessage::count_unread(&db.pool).await.unwrap(), 1);

        assert!(
            ContactMessage::set_read(&db.pool, Uuid::new_v4(), true)
                .await
                .unwrap()
                .is_none()
        );
    }
}
