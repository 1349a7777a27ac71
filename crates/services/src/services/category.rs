use chrono::Utc;
use db::models::category::{Category, CreateCategory, UpdateCategory};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::content::{ContentError, map_slug_conflict, non_blank, patch_optional, resolve_slug, touched};

const ENTITY: &str = "category";

#[derive(Clone)]
pub struct CategoryService {
    pool: SqlitePool,
}

impl CategoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ContentError> {
        Ok(Category::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Category, ContentError> {
        Category::find_by_id(&self.pool, id)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, ContentError> {
        Category::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn create(&self, data: CreateCategory) -> Result<Category, ContentError> {
        let slug = resolve_slug(data.slug.as_deref(), &data.name)?;
        self.ensure_slug_free(&slug, None).await?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: data.name.trim().to_string(),
            slug,
            description: non_blank(data.description),
            display_order: data.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        let category = Category::insert(&self.pool, &category)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &category.slug))?;
        info!(category_id = %category.id, slug = %category.slug, "Created category");
        Ok(category)
    }

    pub async fn update(&self, id: Uuid, data: UpdateCategory) -> Result<Category, ContentError> {
        let mut category = self.get(id).await?;
        if let Some(slug) = data.slug.as_deref() {
            category.slug = resolve_slug(Some(slug), slug)?;
            self.ensure_slug_free(&category.slug, Some(id)).await?;
        }
        if let Some(name) = data.name {
            category.name = name.trim().to_string();
        }
        category.description = patch_optional(category.description, data.description);
        if let Some(order) = data.display_order {
            category.display_order = order;
        }
        category.updated_at = touched(category.updated_at);

        Category::update(&self.pool, &category)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &category.slug))
    }

    /// Services of the category stay, detached.
    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        if Category::delete(&self.pool, id).await? == 0 {
            return Err(ContentError::NotFound(ENTITY));
        }
        info!(category_id = %id, "Deleted category");
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, own_id: Option<Uuid>) -> Result<(), ContentError> {
        match Category::find_by_slug(&self.pool, slug).await? {
            Some(existing) if Some(existing.id) != own_id => Err(ContentError::SlugTaken {
                entity: ENTITY,
                slug: slug.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
