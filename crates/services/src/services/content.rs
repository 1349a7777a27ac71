//! Pieces shared by the structured-content services.

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::media::{IncomingFile, MediaError, MediaPurpose, MediaService, StoredMedia};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("a {entity} with slug '{slug}' already exists")]
    SlugTaken { entity: &'static str, slug: String },
    #[error("'{0}' does not produce a usable slug")]
    InvalidSlug(String),
    #[error("category {0} does not exist")]
    UnknownCategory(Uuid),
}

/// Slug from the explicit value if given, otherwise from `source`.
pub fn resolve_slug(explicit: Option<&str>, source: &str) -> Result<String, ContentError> {
    let raw = explicit.unwrap_or(source);
    let slug = utils::text::slugify(raw);
    if slug.is_empty() {
        return Err(ContentError::InvalidSlug(raw.to_string()));
    }
    Ok(slug)
}

/// Trimmed text, or `None` when blank. Lets clients clear optional fields
/// with an empty string.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Applies a partial update to an optional field: absent keeps `current`,
/// blank clears it.
pub fn patch_optional(current: Option<String>, patch: Option<String>) -> Option<String> {
    match patch {
        None => current,
        Some(value) => non_blank(Some(value)),
    }
}

/// Modification time for a row last touched at `previous`.
pub fn touched(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous)
}

/// Turns a unique-constraint failure on `slug` into [`ContentError::SlugTaken`].
pub fn map_slug_conflict(err: sqlx::Error, entity: &'static str, slug: &str) -> ContentError {
    let unique = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if unique {
        ContentError::SlugTaken {
            entity,
            slug: slug.to_string(),
        }
    } else {
        ContentError::Database(err)
    }
}

/// Uploads `file`, hands the stored object to `persist` and removes the
/// object it replaces. When `persist` fails the new upload is discarded
/// instead, so the row and the store stay in step.
pub async fn replace_media<T, F, Fut>(
    media: &MediaService,
    file: IncomingFile,
    purpose: MediaPurpose,
    previous_key: Option<String>,
    persist: F,
) -> Result<T, ContentError>
where
    F: FnOnce(StoredMedia) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let stored = media.upload(file, purpose).await?;
    let new_key = stored.key.clone();
    match persist(stored).await {
        Ok(value) => {
            media.discard_media(previous_key.as_deref()).await;
            Ok(value)
        }
        Err(e) => {
            warn!(key = %new_key, error = %e, "Discarding upload after failed save");
            media.discard_media(Some(&new_key)).await;
            Err(e.into())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_slug() {
        assert_eq!(resolve_slug(None, "Dental Implants").unwrap(), "dental-implants");
        assert_eq!(resolve_slug(Some("Implants 2"), "ignored").unwrap(), "implants-2");
        assert!(matches!(
            resolve_slug(None, "???"),
            Err(ContentError::InvalidSlug(_))
        ));
    }

    #[test]
    fn test_patch_optional() {
        let current = Some("kept".to_string());
        assert_eq!(patch_optional(current.clone(), None), current);
        assert_eq!(patch_optional(current.clone(), Some("  ".to_string())), None);
        assert_eq!(
            patch_optional(current, Some(" new ".to_string())),
            Some("new".to_string())
        );
    }
}
