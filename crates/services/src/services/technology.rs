use chrono::Utc;
use db::models::technology::{CreateTechnology, Technology, UpdateTechnology};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    content::{ContentError, map_slug_conflict, replace_media, resolve_slug, touched},
    media::{IncomingFile, MediaPurpose, MediaService},
};

const ENTITY: &str = "technology";

#[derive(Clone)]
pub struct TechnologyService {
    pool: SqlitePool,
    media: MediaService,
}

impl TechnologyService {
    pub fn new(pool: SqlitePool, media: MediaService) -> Self {
        Self { pool, media }
    }

    pub async fn list(&self) -> Result<Vec<Technology>, ContentError> {
        Ok(Technology::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Technology, ContentError> {
        Technology::find_by_id(&self.pool, id)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Technology, ContentError> {
        Technology::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn create(&self, data: CreateTechnology) -> Result<Technology, ContentError> {
        let slug = resolve_slug(data.slug.as_deref(), &data.name)?;
        if Technology::find_by_slug(&self.pool, &slug).await?.is_some() {
            return Err(ContentError::SlugTaken { entity: ENTITY, slug });
        }

        let now = Utc::now();
        let technology = Technology {
            id: Uuid::new_v4(),
            name: data.name.trim().to_string(),
            slug,
            description: data.description,
            image_url: None,
            image_key: None,
            display_order: data.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        let technology = Technology::insert(&self.pool, &technology)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &technology.slug))?;
        info!(technology_id = %technology.id, "Created technology");
        Ok(technology)
    }

    pub async fn update(&self, id: Uuid, data: UpdateTechnology) -> Result<Technology, ContentError> {
        let mut technology = self.get(id).await?;
        if let Some(slug) = data.slug.as_deref() {
            let slug = resolve_slug(Some(slug), slug)?;
            match Technology::find_by_slug(&self.pool, &slug).await? {
                Some(existing) if existing.id != id => {
                    return Err(ContentError::SlugTaken { entity: ENTITY, slug });
                }
                _ => technology.slug = slug,
            }
        }
        if let Some(name) = data.name {
            technology.name = name.trim().to_string();
        }
        if let Some(description) = data.description {
            technology.description = description;
        }
        if let Some(order) = data.display_order {
            technology.display_order = order;
        }
        technology.updated_at = touched(technology.updated_at);

        Technology::update(&self.pool, &technology)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &technology.slug))
    }

    pub async fn set_image(&self, id: Uuid, file: IncomingFile) -> Result<Technology, ContentError> {
        let mut technology = self.get(id).await?;
        let previous = technology.image_key.take();
        replace_media(&self.media, file, MediaPurpose::TechnologyImage, previous, |stored| {
            technology.image_key = Some(stored.key);
            technology.image_url = Some(stored.url);
            technology.updated_at = touched(technology.updated_at);
            let pool = self.pool.clone();
            async move { Technology::update(&pool, &technology).await }
        })
        .await
    }

    pub async fn remove_image(&self, id: Uuid) -> Result<Technology, ContentError> {
        let mut technology = self.get(id).await?;
        let previous = technology.image_key.take();
        technology.image_url = None;
        technology.updated_at = touched(technology.updated_at);
        let technology = Technology::update(&self.pool, &technology).await?;
        self.media.discard_media(previous.as_deref()).await;
        Ok(technology)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        let technology = self.get(id).await?;
        Technology::delete(&self.pool, id).await?;
        self.media.discard_media(technology.image_key.as_deref()).await;
        info!(technology_id = %id, "Deleted technology");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content::test_support::{Fixture, png};

    fn create(name: &str, order: i64) -> CreateTechnology {
        CreateTechnology {
            name: name.to_string(),
            slug: None,
            description: "<p>Low-dose imaging.</p>".to_string(),
            display_order: Some(order),
        }
    }

    #[tokio::test]
    async fn test_list_follows_display_order() {
        let fixture = Fixture::new().await;
        let technologies = TechnologyService::new(fixture.db.pool.clone(), fixture.media.clone());
        technologies.create(create("Intraoral Scanner", 2)).await.unwrap();
        technologies.create(create("Digital X-Ray", 1)).await.unwrap();

        let names: Vec<_> = technologies
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["Digital X-Ray", "Intraoral Scanner"]);
        assert_eq!(
            technologies.get_by_slug("digital-x-ray").await.unwrap().display_order,
            1
        );
    }

    #[tokio::test]
    async fn test_slug_conflict_on_update() {
        let fixture = Fixture::new().await;
        let technologies = TechnologyService::new(fixture.db.pool.clone(), fixture.media.clone());
        technologies.create(create("Laser", 0)).await.unwrap();
        let cbct = technologies.create(create("CBCT", 0)).await.unwrap();

        let result = technologies
            .update(
                cbct.id,
                UpdateTechnology {
                    slug: Some("laser".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ContentError::SlugTaken { .. })));
    }

    #[tokio::test]
    async fn test_delete_discards_image() {
        let fixture = Fixture::new().await;
        let technologies = TechnologyService::new(fixture.db.pool.clone(), fixture.media.clone());
        let laser = technologies.create(create("Laser", 0)).await.unwrap();
        let laser = technologies.set_image(laser.id, png("laser.png")).await.unwrap();
        let key = laser.image_key.clone().unwrap();
        assert!(key.starts_with("technologies/"));

        technologies.delete(laser.id).await.unwrap();
        assert!(!fixture.stored(&key));
    }
}
