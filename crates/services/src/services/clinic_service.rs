//! The treatments offered by the clinic.

use chrono::Utc;
use db::models::{
    category::Category,
    clinic_service::{ClinicService, CreateClinicService, UpdateClinicService},
};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    content::{
        ContentError, map_slug_conflict, non_blank, patch_optional, replace_media, resolve_slug,
        touched,
    },
    media::{IncomingFile, MediaPurpose, MediaService},
};

const ENTITY: &str = "service";

#[derive(Clone)]
pub struct ClinicServiceService {
    pool: SqlitePool,
    media: MediaService,
}

impl ClinicServiceService {
    pub fn new(pool: SqlitePool, media: MediaService) -> Self {
        Self { pool, media }
    }

    /// Every service, drafts included.
    pub async fn list(&self) -> Result<Vec<ClinicService>, ContentError> {
        Ok(ClinicService::find_all(&self.pool).await?)
    }

    pub async fn list_published(&self) -> Result<Vec<ClinicService>, ContentError> {
        Ok(ClinicService::find_published(&self.pool).await?)
    }

    pub async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<ClinicService>, ContentError> {
        Ok(ClinicService::find_by_category(&self.pool, category_id).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ClinicService, ContentError> {
        ClinicService::find_by_id(&self.pool, id)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    /// Drafts are only visible when `include_drafts` is set.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<ClinicService, ContentError> {
        ClinicService::find_by_slug(&self.pool, slug)
            .await?
            .filter(|service| include_drafts || service.is_published)
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn create(&self, data: CreateClinicService) -> Result<ClinicService, ContentError> {
        let slug = resolve_slug(data.slug.as_deref(), &data.title)?;
        self.ensure_slug_free(&slug, None).await?;
        if let Some(category_id) = data.category_id {
            self.ensure_category(category_id).await?;
        }

        let now = Utc::now();
        let service = ClinicService {
            id: Uuid::new_v4(),
            category_id: data.category_id,
            title: data.title.trim().to_string(),
            slug,
            summary: non_blank(data.summary),
            description: data.description,
            image_url: None,
            image_key: None,
            display_order: data.display_order.unwrap_or(0),
            is_published: data.is_published.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let service = ClinicService::insert(&self.pool, &service)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &service.slug))?;
        info!(service_id = %service.id, slug = %service.slug, "Created service");
        Ok(service)
    }

    pub async fn update(
        &self,
        id: Uuid,
        data: UpdateClinicService,
    ) -> Result<ClinicService, ContentError> {
        let mut service = self.get(id).await?;
        if let Some(slug) = data.slug.as_deref() {
            service.slug = resolve_slug(Some(slug), slug)?;
            self.ensure_slug_free(&service.slug, Some(id)).await?;
        }
        if data.clear_category {
            service.category_id = None;
        } else if let Some(category_id) = data.category_id {
            self.ensure_category(category_id).await?;
            service.category_id = Some(category_id);
        }
        if let Some(title) = data.title {
            service.title = title.trim().to_string();
        }
        service.summary = patch_optional(service.summary, data.summary);
        if let Some(description) = data.description {
            service.description = description;
        }
        if let Some(order) = data.display_order {
            service.display_order = order;
        }
        if let Some(published) = data.is_published {
            service.is_published = published;
        }
        service.updated_at = touched(service.updated_at);

        ClinicService::update(&self.pool, &service)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &service.slug))
    }

    pub async fn set_image(&self, id: Uuid, file: IncomingFile) -> Result<ClinicService, ContentError> {
        let mut service = self.get(id).await?;
        let previous = service.image_key.take();
        replace_media(&self.media, file, MediaPurpose::ServiceImage, previous, |stored| {
            service.image_key = Some(stored.key);
            service.image_url = Some(stored.url);
            service.updated_at = touched(service.updated_at);
            let pool = self.pool.clone();
            async move { ClinicService::update(&pool, &service).await }
        })
        .await
    }

    pub async fn remove_image(&self, id: Uuid) -> Result<ClinicService, ContentError> {
        let mut service = self.get(id).await?;
        let previous = service.image_key.take();
        service.image_url = None;
        service.updated_at = touched(service.updated_at);
        let service = ClinicService::update(&self.pool, &service).await?;
        self.media.discard_media(previous.as_deref()).await;
        Ok(service)
    }

    /// Removes the row and, best-effort, its image.
    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        let service = self.get(id).await?;
        ClinicService::delete(&self.pool, id).await?;
        self.media.discard_media(service.image_key.as_deref()).await;
        info!(service_id = %id, "Deleted service");
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, own_id: Option<Uuid>) -> Result<(), ContentError> {
        match ClinicService::find_by_slug(&self.pool, slug).await? {
            Some(existing) if Some(existing.id) != own_id => Err(ContentError::SlugTaken {
                entity: ENTITY,
                slug: slug.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), ContentError> {
        match Category::find_by_id(&self.pool, category_id).await? {
            Some(_) => Ok(()),
            None => Err(ContentError::UnknownCategory(category_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content::test_support::{Fixture, pdf, png};

    fn create(title: &str, published: bool) -> CreateClinicService {
        CreateClinicService {
            category_id: None,
            title: title.to_string(),
            slug: None,
            summary: Some("Short summary".to_string()),
            description: "<p>Details</p>".to_string(),
            display_order: None,
            is_published: Some(published),
        }
    }

    #[tokio::test]
    async fn test_published_filter() {
        let fixture = Fixture::new().await;
        let services = ClinicServiceService::new(fixture.db.pool.clone(), fixture.media.clone());
        services.create(create("Teeth Whitening", true)).await.unwrap();
        services.create(create("Veneers", false)).await.unwrap();

        assert_eq!(services.list().await.unwrap().len(), 2);
        let published = services.list_published().await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].slug, "teeth-whitening");

        assert!(matches!(
            services.get_by_slug("veneers", false).await,
            Err(ContentError::NotFound(_))
        ));
        assert!(services.get_by_slug("veneers", true).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let fixture = Fixture::new().await;
        let services = ClinicServiceService::new(fixture.db.pool.clone(), fixture.media.clone());
        let mut data = create("Implants", true);
        let missing = Uuid::new_v4();
        data.category_id = Some(missing);
        assert!(matches!(
            services.create(data).await,
            Err(ContentError::UnknownCategory(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_update_and_clear_summary() {
        let fixture = Fixture::new().await;
        let services = ClinicServiceService::new(fixture.db.pool.clone(), fixture.media.clone());
        let service = services.create(create("Root Canal", true)).await.unwrap();

        let updated = services
            .update(
                service.id,
                UpdateClinicService {
                    summary: Some(String::new()),
                    title: Some("Root Canal Treatment".to_string()),
                    is_published: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.summary, None);
        assert_eq!(updated.title, "Root Canal Treatment");
        assert_eq!(updated.slug, "root-canal");
        assert!(!updated.is_published);
    }

    #[tokio::test]
    async fn test_image_lifecycle() {
        let fixture = Fixture::new().await;
        let services = ClinicServiceService::new(fixture.db.pool.clone(), fixture.media.clone());
        let service = services.create(create("Crowns", true)).await.unwrap();

        let first = services.set_image(service.id, png("crown.png")).await.unwrap();
        let first_key = first.image_key.clone().unwrap();
        assert!(fixture.stored(&first_key));
        assert_eq!(first.image_url, Some(format!("/media/{first_key}")));

        let second = services.set_image(service.id, png("crown-2.png")).await.unwrap();
        let second_key = second.image_key.clone().unwrap();
        assert_ne!(first_key, second_key);
        assert!(!fixture.stored(&first_key));
        assert!(fixture.stored(&second_key));

        assert!(matches!(
            services.set_image(service.id, pdf("crown.pdf")).await,
            Err(ContentError::Media(_))
        ));

        let cleared = services.remove_image(service.id).await.unwrap();
        assert_eq!(cleared.image_key, None);
        assert_eq!(cleared.image_url, None);
        assert!(!fixture.stored(&second_key));
    }

    #[tokio::test]
    async fn test_delete_removes_image() {
        let fixture = Fixture::new().await;
        let services = ClinicServiceService::new(fixture.db.pool.clone(), fixture.media.clone());
        let service = services.create(create("Bridges", true)).await.unwrap();
        let with_image = services.set_image(service.id, png("bridge.png")).await.unwrap();
        let key = with_image.image_key.unwrap();

        services.delete(service.id).await.unwrap();
        assert!(!fixture.stored(&key));
        assert!(matches!(
            services.get(service.id).await,
            Err(ContentError::NotFound("service"))
        ));
    }
}
