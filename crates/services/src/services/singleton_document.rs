//! Policy documents (office policy, privacy policy, terms of service) that
//! exist at most once per kind.
//!
//! The tables carry no uniqueness constraint, so the service keeps the
//! single-row invariant itself: the oldest row is canonical, writes go to
//! it, and any newer rows found on read or write are folded into it and
//! deleted in the same transaction.

use chrono::{DateTime, Duration, Utc};
use db::models::policy_document::{PolicyDocument, PolicyDocumentKind, UpsertPolicyDocument};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SingletonDocumentError {
    #[error("failed to fetch {document}")]
    Fetch {
        document: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to save {document}")]
    Save {
        document: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("deleting the {0} is not allowed")]
    DeleteNotAllowed(&'static str),
}

#[derive(Clone)]
pub struct SingletonDocumentService {
    pool: SqlitePool,
    kind: PolicyDocumentKind,
}

impl SingletonDocumentService {
    pub fn new(pool: SqlitePool, kind: PolicyDocumentKind) -> Self {
        Self { pool, kind }
    }

    /// The canonical document, or `None` when nothing was written yet.
    /// Collapses duplicates first.
    pub async fn get(&self) -> Result<Option<PolicyDocument>, SingletonDocumentError> {
        self.collapse_duplicates()
            .await
            .map_err(|source| self.fetch_failed(source))
    }

    /// Creates the document if none exists, otherwise overwrites the
    /// canonical row. Stale duplicates are removed atomically with the
    /// update.
    pub async fn create_or_update(
        &self,
        data: &UpsertPolicyDocument,
    ) -> Result<PolicyDocument, SingletonDocumentError> {
        self.write(data)
            .await
            .map_err(|source| self.save_failed(source))
    }

    /// 0 or 1.
    pub async fn count(&self) -> Result<i64, SingletonDocumentError> {
        Ok(self.get().await?.map_or(0, |_| 1))
    }

    /// Policy documents are never removed once written.
    pub async fn delete(&self) -> Result<(), SingletonDocumentError> {
        warn!(document = %self.kind, "Rejected attempt to delete singleton document");
        Err(SingletonDocumentError::DeleteNotAllowed(self.kind.label()))
    }

    async fn write(&self, data: &UpsertPolicyDocument) -> Result<PolicyDocument, sqlx::Error> {
        let kind = self.kind;
        let now = Utc::now();
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let id = Uuid::new_v4();
        if PolicyDocument::insert_if_empty(&mut *tx, kind, id, data, now).await? {
            let created = PolicyDocument::find_by_id(&mut *tx, kind, id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            tx.commit().await?;
            info!(document = %kind, id = %created.id, "Created singleton document");
            return Ok(created);
        }

        let rows = PolicyDocument::find_all_oldest_first(&mut *tx, kind).await?;
        let (canonical, stale) = rows.split_first().ok_or(sqlx::Error::RowNotFound)?;
        let updated = PolicyDocument::update(
            &mut *tx,
            kind,
            canonical.id,
            &data.hosting_date,
            &data.description,
            next_updated_at(now, &rows),
        )
        .await?;
        let stale_ids: Vec<Uuid> = stale.iter().map(|row| row.id).collect();
        let removed = PolicyDocument::delete_many(&mut *tx, kind, &stale_ids).await?;
        tx.commit().await?;

        if removed > 0 {
            warn!(
                document = %kind,
                id = %updated.id,
                removed,
                "Removed duplicate singleton documents while saving"
            );
        }
        info!(document = %kind, id = %updated.id, "Updated singleton document");
        Ok(updated)
    }

    async fn collapse_duplicates(&self) -> Result<Option<PolicyDocument>, sqlx::Error> {
        let kind = self.kind;
        let rows = PolicyDocument::find_all_oldest_first(&self.pool, kind).await?;
        if rows.len() <= 1 {
            return Ok(rows.into_iter().next());
        }

        // Re-read under the write lock; another request may have cleaned up
        // in between.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        let rows = PolicyDocument::find_all_oldest_first(&mut *tx, kind).await?;
        let Some((canonical, stale)) = rows.split_first() else {
            return Ok(None);
        };
        if stale.is_empty() {
            return Ok(Some(canonical.clone()));
        }

        // Ties on updated_at go to the newer row.
        let latest = rows
            .iter()
            .max_by_key(|row| row.updated_at)
            .unwrap_or(canonical);
        let collapsed = if latest.id == canonical.id {
            canonical.clone()
        } else {
            PolicyDocument::update(
                &mut *tx,
                kind,
                canonical.id,
                &latest.hosting_date,
                &latest.description,
                next_updated_at(Utc::now(), &rows),
            )
            .await?
        };
        let stale_ids: Vec<Uuid> = stale.iter().map(|row| row.id).collect();
        let removed = PolicyDocument::delete_many(&mut *tx, kind, &stale_ids).await?;
        tx.commit().await?;

        warn!(
            document = %kind,
            id = %collapsed.id,
            removed,
            "Collapsed duplicate singleton documents"
        );
        Ok(Some(collapsed))
    }

    fn fetch_failed(&self, source: sqlx::Error) -> SingletonDocumentError {
        error!(document = %self.kind, error = %source, "Failed to fetch singleton document");
        SingletonDocumentError::Fetch {
            document: self.kind.label(),
            source,
        }
    }

    fn save_failed(&self, source: sqlx::Error) -> SingletonDocumentError {
        error!(document = %self.kind, error = %source, "Failed to save singleton document");
        SingletonDocumentError::Save {
            document: self.kind.label(),
            source,
        }
    }
}

/// `now`, unless a row already carries a timestamp at or after it (clock
/// skew, sub-resolution writes). `updated_at` never moves backwards.
fn next_updated_at(now: DateTime<Utc>, rows: &[PolicyDocument]) -> DateTime<Utc> {
    match rows.iter().map(|row| row.updated_at).max() {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}
