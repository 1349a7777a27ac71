use chrono::Utc;
use db::models::first_visit::{FirstVisit, UpsertFirstVisit};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    content::{ContentError, replace_media, touched},
    media::{IncomingFile, MediaPurpose, MediaService},
};

const ENTITY: &str = "first visit page";

/// The single "your first visit" page.
#[derive(Clone)]
pub struct FirstVisitService {
    pool: SqlitePool,
    media: MediaService,
}

impl FirstVisitService {
    pub fn new(pool: SqlitePool, media: MediaService) -> Self {
        Self { pool, media }
    }

    pub async fn get(&self) -> Result<Option<FirstVisit>, ContentError> {
        Ok(FirstVisit::find(&self.pool).await?)
    }

    /// Writes the text content, keeping any image already attached.
    pub async fn upsert(&self, data: UpsertFirstVisit) -> Result<FirstVisit, ContentError> {
        let now = Utc::now();
        let page = match self.get().await? {
            Some(existing) => FirstVisit {
                title: data.title.trim().to_string(),
                description: data.description,
                updated_at: touched(existing.updated_at),
                ..existing
            },
            None => FirstVisit {
                id: Uuid::new_v4(),
                title: data.title.trim().to_string(),
                description: data.description,
                image_url: None,
                image_key: None,
                created_at: now,
                updated_at: now,
            },
        };
        let page = FirstVisit::upsert(&self.pool, &page).await?;
        info!(page_id = %page.id, "Saved first visit page");
        Ok(page)
    }

    pub async fn set_image(&self, file: IncomingFile) -> Result<FirstVisit, ContentError> {
        let mut page = self.get().await?.ok_or(ContentError::NotFound(ENTITY))?;
        let previous = page.image_key.take();
        replace_media(&self.media, file, MediaPurpose::FirstVisitImage, previous, |stored| {
            page.image_key = Some(stored.key);
            page.image_url = Some(stored.url);
            page.updated_at = touched(page.updated_at);
            let pool = self.pool.clone();
            async move { FirstVisit::upsert(&pool, &page).await }
        })
        .await
    }

    pub async fn remove_image(&self) -> Result<FirstVisit, ContentError> {
        let mut page = self.get().await?.ok_or(ContentError::NotFound(ENTITY))?;
        let previous = page.image_key.take();
        page.image_url = None;
        page.updated_at = touched(page.updated_at);
        let page = FirstVisit::upsert(&self.pool, &page).await?;
        self.media.discard_media(previous.as_deref()).await;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content::test_support::{Fixture, png};

    fn content(title: &str) -> UpsertFirstVisit {
        UpsertFirstVisit {
            title: title.to_string(),
            description: "<p>Arrive ten minutes early.</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_image_and_identity() {
        let fixture = Fixture::new().await;
        let first_visit = FirstVisitService::new(fixture.db.pool.clone(), fixture.media.clone());
        assert!(first_visit.get().await.unwrap().is_none());
        assert!(matches!(
            first_visit.set_image(png("lobby.png")).await,
            Err(ContentError::NotFound(_))
        ));

        let created = first_visit.upsert(content("Your first visit")).await.unwrap();
        let with_image = first_visit.set_image(png("lobby.png")).await.unwrap();
        assert_eq!(with_image.id, created.id);

        let updated = first_visit.upsert(content("Welcome")).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Welcome");
        assert_eq!(updated.image_key, with_image.image_key);
        assert_eq!(updated.created_at, created.created_at);

        let key = updated.image_key.unwrap();
        let cleared = first_visit.remove_image().await.unwrap();
        assert_eq!(cleared.image_url, None);
        assert!(!fixture.stored(&key));
    }
}
