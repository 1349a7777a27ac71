use chrono::Utc;
use db::models::member::{CreateMember, Member, UpdateMember};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    content::{ContentError, non_blank, patch_optional, replace_media, touched},
    media::{IncomingFile, MediaPurpose, MediaService},
};

const ENTITY: &str = "team member";

/// Team members and their portraits.
#[derive(Clone)]
pub struct MemberService {
    pool: SqlitePool,
    media: MediaService,
}

impl MemberService {
    pub fn new(pool: SqlitePool, media: MediaService) -> Self {
        Self { pool, media }
    }

    pub async fn list(&self) -> Result<Vec<Member>, ContentError> {
        Ok(Member::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Member, ContentError> {
        Member::find_by_id(&self.pool, id)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn create(&self, data: CreateMember) -> Result<Member, ContentError> {
        let now = Utc::now();
        let member = Member {
            id: Uuid::new_v4(),
            name: data.name.trim().to_string(),
            position: data.position.trim().to_string(),
            bio: non_blank(data.bio),
            image_url: None,
            image_key: None,
            display_order: data.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        let member = Member::insert(&self.pool, &member).await?;
        info!(member_id = %member.id, "Created team member");
        Ok(member)
    }

    pub async fn update(&self, id: Uuid, data: UpdateMember) -> Result<Member, ContentError> {
        let mut member = self.get(id).await?;
        if let Some(name) = data.name {
            member.name = name.trim().to_string();
        }
        if let Some(position) = data.position {
            member.position = position.trim().to_string();
        }
        member.bio = patch_optional(member.bio, data.bio);
        if let Some(order) = data.display_order {
            member.display_order = order;
        }
        member.updated_at = touched(member.updated_at);
        Ok(Member::update(&self.pool, &member).await?)
    }

    pub async fn set_image(&self, id: Uuid, file: IncomingFile) -> Result<Member, ContentError> {
        let mut member = self.get(id).await?;
        let previous = member.image_key.take();
        replace_media(&self.media, file, MediaPurpose::MemberPortrait, previous, |stored| {
            member.image_key = Some(stored.key);
            member.image_url = Some(stored.url);
            member.updated_at = touched(member.updated_at);
            let pool = self.pool.clone();
            async move { Member::update(&pool, &member).await }
        })
        .await
    }

    pub async fn remove_image(&self, id: Uuid) -> Result<Member, ContentError> {
        let mut member = self.get(id).await?;
        let previous = member.image_key.take();
        member.image_url = None;
        member.updated_at = touched(member.updated_at);
        let member = Member::update(&self.pool, &member).await?;
        self.media.discard_media(previous.as_deref()).await;
        Ok(member)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        let member = self.get(id).await?;
        Member::delete(&self.pool, id).await?;
        self.media.discard_media(member.image_key.as_deref()).await;
        info!(member_id = %id, "Deleted team member");
        Ok(())
    }
}
