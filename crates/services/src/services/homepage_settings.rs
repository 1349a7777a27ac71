use chrono::Utc;
use db::models::homepage_settings::{HomepageSettings, UpsertHomepageSettings};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    content::{ContentError, non_blank, replace_media, touched},
    media::{IncomingFile, MediaPurpose, MediaService},
};

const ENTITY: &str = "homepage settings";

/// Hero banner and contact details shown on the home page.
#[derive(Clone)]
pub struct HomepageSettingsService {
    pool: SqlitePool,
    media: MediaService,
}

impl HomepageSettingsService {
    pub fn new(pool: SqlitePool, media: MediaService) -> Self {
        Self { pool, media }
    }

    pub async fn get(&self) -> Result<Option<HomepageSettings>, ContentError> {
        Ok(HomepageSettings::find(&self.pool).await?)
    }

    pub async fn upsert(
        &self,
        data: UpsertHomepageSettings,
    ) -> Result<HomepageSettings, ContentError> {
        let now = Utc::now();
        let existing = self.get().await?;
        let settings = HomepageSettings {
            id: existing.as_ref().map_or_else(Uuid::new_v4, |s| s.id),
            hero_title: data.hero_title.trim().to_string(),
            hero_subtitle: non_blank(data.hero_subtitle),
            hero_image_url: existing.as_ref().and_then(|s| s.hero_image_url.clone()),
            hero_image_key: existing.as_ref().and_then(|s| s.hero_image_key.clone()),
            phone: non_blank(data.phone),
            email: non_blank(data.email),
            address: non_blank(data.address),
            opening_hours: non_blank(data.opening_hours),
            created_at: existing.as_ref().map_or(now, |s| s.created_at),
            updated_at: existing.as_ref().map_or(now, |s| touched(s.updated_at)),
        };
        let settings = HomepageSettings::upsert(&self.pool, &settings).await?;
        info!("Saved homepage settings");
        Ok(settings)
    }

    pub async fn set_hero_image(&self, file: IncomingFile) -> Result<HomepageSettings, ContentError> {
        let mut settings = self.get().await?.ok_or(ContentError::NotFound(ENTITY))?;
        let previous = settings.hero_image_key.take();
        replace_media(&self.media, file, MediaPurpose::HeroImage, previous, |stored| {
            settings.hero_image_key = Some(stored.key);
            settings.hero_image_url = Some(stored.url);
            settings.updated_at = touched(settings.updated_at);
            let pool = self.pool.clone();
            async move { HomepageSettings::upsert(&pool, &settings).await }
        })
        .await
    }

    pub async fn remove_hero_image(&self) -> Result<HomepageSettings, ContentError> {
        let mut settings = self.get().await?.ok_or(ContentError::NotFound(ENTITY))?;
        let previous = settings.hero_image_key.take();
        settings.hero_image_url = None;
        settings.updated_at = touched(settings.updated_at);
        let settings = HomepageSettings::upsert(&self.pool, &settings).await?;
        self.media.discard_media(previous.as_deref()).await;
        Ok(settings)
    }
}
