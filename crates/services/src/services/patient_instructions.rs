//! Care instructions with optional downloadable PDFs.

use chrono::Utc;
use db::models::patient_instruction::{
    CreatePatientInstruction, PatientInstruction, UpdatePatientInstruction,
};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{
    content::{ContentError, map_slug_conflict, replace_media, resolve_slug, touched},
    media::{IncomingFile, MediaPurpose, MediaService},
};

const ENTITY: &str = "patient instruction";

#[derive(Clone)]
pub struct PatientInstructionsService {
    pool: SqlitePool,
    media: MediaService,
}

impl PatientInstructionsService {
    pub fn new(pool: SqlitePool, media: MediaService) -> Self {
        Self { pool, media }
    }

    pub async fn list(&self) -> Result<Vec<PatientInstruction>, ContentError> {
        Ok(PatientInstruction::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<PatientInstruction, ContentError> {
        PatientInstruction::find_by_id(&self.pool, id)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<PatientInstruction, ContentError> {
        PatientInstruction::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ContentError::NotFound(ENTITY))
    }

    pub async fn create(
        &self,
        data: CreatePatientInstruction,
    ) -> Result<PatientInstruction, ContentError> {
        let slug = resolve_slug(data.slug.as_deref(), &data.title)?;
        if PatientInstruction::find_by_slug(&self.pool, &slug).await?.is_some() {
            return Err(ContentError::SlugTaken { entity: ENTITY, slug });
        }

        let now = Utc::now();
        let instruction = PatientInstruction {
            id: Uuid::new_v4(),
            title: data.title.trim().to_string(),
            slug,
            content: data.content,
            attachment_url: None,
            attachment_key: None,
            display_order: data.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };
        let instruction = PatientInstruction::insert(&self.pool, &instruction)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &instruction.slug))?;
        info!(instruction_id = %instruction.id, "Created patient instruction");
        Ok(instruction)
    }

    pub async fn update(
        &self,
        id: Uuid,
        data: UpdatePatientInstruction,
    ) -> Result<PatientInstruction, ContentError> {
        let mut instruction = self.get(id).await?;
        if let Some(slug) = data.slug.as_deref() {
            let slug = resolve_slug(Some(slug), slug)?;
            match PatientInstruction::find_by_slug(&self.pool, &slug).await? {
                Some(existing) if existing.id != id => {
                    return Err(ContentError::SlugTaken { entity: ENTITY, slug });
                }
                _ => instruction.slug = slug,
            }
        }
        if let Some(title) = data.title {
            instruction.title = title.trim().to_string();
        }
        if let Some(content) = data.content {
            instruction.content = content;
        }
        if let Some(order) = data.display_order {
            instruction.display_order = order;
        }
        instruction.updated_at = touched(instruction.updated_at);

        PatientInstruction::update(&self.pool, &instruction)
            .await
            .map_err(|e| map_slug_conflict(e, ENTITY, &instruction.slug))
    }

    pub async fn set_attachment(
        &self,
        id: Uuid,
        file: IncomingFile,
    ) -> Result<PatientInstruction, ContentError> {
        let mut instruction = self.get(id).await?;
        let previous = instruction.attachment_key.take();
        replace_media(
            &self.media,
            file,
            MediaPurpose::InstructionAttachment,
            previous,
            |stored| {
                instruction.attachment_key = Some(stored.key);
                instruction.attachment_url = Some(stored.url);
                instruction.updated_at = touched(instruction.updated_at);
                let pool = self.pool.clone();
                async move { PatientInstruction::update(&pool, &instruction).await }
            },
        )
        .await
    }

    pub async fn remove_attachment(&self, id: Uuid) -> Result<PatientInstruction, ContentError> {
        let mut instruction = self.get(id).await?;
        let previous = instruction.attachment_key.take();
        instruction.attachment_url = None;
        instruction.updated_at = touched(instruction.updated_at);
        let instruction = PatientInstruction::update(&self.pool, &instruction).await?;
        self.media.discard_media(previous.as_deref()).await;
        Ok(instruction)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContentError> {
        let instruction = self.get(id).await?;
        PatientInstruction::delete(&self.pool, id).await?;
        self.media
            .discard_media(instruction.attachment_key.as_deref())
            .await;
        info!(instruction_id = %id, "Deleted patient instruction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content::test_support::{Fixture, pdf, png};

    fn create(title: &str) -> CreatePatientInstruction {
        CreatePatientInstruction {
            title: title.to_string(),
            slug: None,
            content: "<ol><li>Do not eat for two hours.</li></ol>".to_string(),
            display_order: None,
        }
    }

    #[tokio::test]
    async fn test_attachment_accepts_only_pdf() {
        let fixture = Fixture::new().await;
        let instructions =
            PatientInstructionsService::new(fixture.db.pool.clone(), fixture.media.clone());
        let instruction = instructions.create(create("After Extraction")).await.unwrap();
        assert_eq!(instruction.slug, "after-extraction");

        assert!(matches!(
            instructions.set_attachment(instruction.id, png("scan.png")).await,
            Err(ContentError::Media(_))
        ));

        let with_pdf = instructions
            .set_attachment(instruction.id, pdf("After Extraction.pdf"))
            .await
            .unwrap();
        let key = with_pdf.attachment_key.clone().unwrap();
        assert!(key.starts_with("patient-instructions/"));
        assert!(key.ends_with("after-extraction.pdf"));
        assert!(fixture.stored(&key));

        let without = instructions.remove_attachment(instruction.id).await.unwrap();
        assert_eq!(without.attachment_url, None);
        assert!(!fixture.stored(&key));
    }

    #[tokio::test]
    async fn test_duplicate_slug() {
        let fixture = Fixture::new().await;
        let instructions =
            PatientInstructionsService::new(fixture.db.pool.clone(), fixture.media.clone());
        instructions.create(create("Whitening Aftercare")).await.unwrap();
        assert!(matches!(
            instructions.create(create("Whitening aftercare")).await,
            Err(ContentError::SlugTaken { .. })
        ));
    }
}
