use chrono::Utc;
use db::models::contact_message::{ContactMessage, CreateContactMessage};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::content::ContentError;

const ENTITY: &str = "contact message";

/// Messages from the public contact form.
#[derive(Clone)]
pub struct ContactService {
    pool: SqlitePool,
}

impl ContactService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn submit(&self, data: CreateContactMessage) -> Result<ContactMessage, ContentError> {
        let message = ContactMessage::create(&self.pool, &data, Uuid::new_v4(), Utc::now()).await?;
        info!(message_id = %message.id, "Received contact message");
        Ok(message)
    }

    pub async fn list(&self) -> Result<Vec<ContactMessage>, ContentError> {
        Ok(ContactMessage::find_all(&self.pool).await?)
    }

    pub async fn mark_read(&self, id: Uuid, is_read: bool) -> Result<ContactMessage, ContentError> {
        ContactMessage::set_read(&self.pool, id, is_read)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn unread_count(&self) -> Result<i64, ContentError> {
        Ok(ContactMessage::count_unread(&self.pool).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        if ContactMessage::delete(&self.pool, id).await? == 0 {
            return Err(ContentError::NotFound(ENTITY));
        }
        Ok(())
    }
}
