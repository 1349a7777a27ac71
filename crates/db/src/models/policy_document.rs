use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// The policy documents the clinic publishes. Each kind lives in its own
/// table with identical columns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PolicyDocumentKind {
    OfficePolicy,
    PrivacyPolicy,
    TermsOfService,
}

impl PolicyDocumentKind {
    pub const ALL: [PolicyDocumentKind; 3] = [
        PolicyDocumentKind::OfficePolicy,
        PolicyDocumentKind::PrivacyPolicy,
        PolicyDocumentKind::TermsOfService,
    ];

    pub fn table(self) -> &'static str {
        match self {
            PolicyDocumentKind::OfficePolicy => "office_policies",
            PolicyDocumentKind::PrivacyPolicy => "privacy_policies",
            PolicyDocumentKind::TermsOfService => "terms_of_service",
        }
    }

    /// Lowercase name used in messages ("privacy policy").
    pub fn label(self) -> &'static str {
        match self {
            PolicyDocumentKind::OfficePolicy => "office policy",
            PolicyDocumentKind::PrivacyPolicy => "privacy policy",
            PolicyDocumentKind::TermsOfService => "terms of service",
        }
    }

    /// Heading used on the public page.
    pub fn title(self) -> &'static str {
        match self {
            PolicyDocumentKind::OfficePolicy => "Office Policy",
            PolicyDocumentKind::PrivacyPolicy => "Privacy Policy",
            PolicyDocumentKind::TermsOfService => "Terms of Service",
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub id: Uuid,
    /// Free-form label chosen by the editor, e.g. "January 2024".
    pub hosting_date: String,
    /// HTML body.
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpsertPolicyDocument {
    #[validate(length(min = 1, message = "Hosting date is required"))]
    pub hosting_date: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

const COLUMNS: &str = "id, hosting_date, description, created_at, updated_at";

impl PolicyDocument {
    /// All rows of `kind`, canonical (oldest) first. Rows sharing a creation
    /// time fall back to insertion order.
    pub async fn find_all_oldest_first<'e, E>(
        executor: E,
        kind: PolicyDocumentKind,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY created_at ASC, rowid ASC",
            kind.table()
        );
        sqlx::query_as::<_, PolicyDocument>(&sql)
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(
        executor: E,
        kind: PolicyDocumentKind,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, PolicyDocument>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn count<'e, E>(executor: E, kind: PolicyDocumentKind) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        sqlx::query_scalar::<_, i64>(&sql).fetch_one(executor).await
    }

    /// Inserts a row with explicit timestamps. No emptiness check; used for
    /// seeding and imports.
    pub async fn insert<'e, E>(
        executor: E,
        kind: PolicyDocumentKind,
        document: &PolicyDocument,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5)",
            kind.table()
        );
        sqlx::query(&sql)
            .bind(document.id)
            .bind(&document.hosting_date)
            .bind(&document.description)
            .bind(document.created_at)
            .bind(document.updated_at)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Inserts the first row of `kind` in a single statement. Returns `false`
    /// without writing when the table already holds a row, which is how two
    /// concurrent first writes avoid producing a duplicate.
    pub async fn insert_if_empty<'e, E>(
        executor: E,
        kind: PolicyDocumentKind,
        id: Uuid,
        data: &UpsertPolicyDocument,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let table = kind.table();
        let sql = format!(
            "INSERT INTO {table} ({COLUMNS})
             SELECT $1, $2, $3, $4, $4
             WHERE NOT EXISTS (SELECT 1 FROM {table})"
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(&data.hosting_date)
            .bind(&data.description)
            .bind(now)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Overwrites the editable fields of row `id`. `created_at` never changes.
    pub async fn update<'e, E>(
        executor: E,
        kind: PolicyDocumentKind,
        id: Uuid,
        hosting_date: &str,
        description: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "UPDATE {}
             SET hosting_date = $2, description = $3, updated_at = $4
             WHERE id = $1
             RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, PolicyDocument>(&sql)
            .bind(id)
            .bind(hosting_date)
            .bind(description)
            .bind(updated_at)
            .fetch_one(executor)
            .await
    }

    pub async fn delete_many<'e, E>(
        executor: E,
        kind: PolicyDocumentKind,
        ids: &[Uuid],
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("DELETE FROM {} WHERE id IN (", kind.table()));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        let result = builder.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Duration;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::DBService;

    fn row(hosting_date: &str, created_at: DateTime<Utc>) -> PolicyDocument {
        PolicyDocument {
            id: Uuid::new_v4(),
            hosting_date: hosting_date.to_string(),
            description: format!("<p>{hosting_date}</p>"),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_kind_round_trips_through_url_segment() {
        for kind in PolicyDocumentKind::iter() {
            assert_eq!(PolicyDocumentKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(PolicyDocumentKind::TermsOfService.to_string(), "terms-of-service");
    }

    #[tokio::test]
    async fn test_find_all_orders_oldest_first() {
        let db = DBService::new_in_memory().await.unwrap();
        let kind = PolicyDocumentKind::PrivacyPolicy;
        let t0 = Utc::now();
        let newer = row("newer", t0 + Duration::seconds(5));
        let older = row("older", t0);
        PolicyDocument::insert(&db.pool, kind, &newer).await.unwrap();
        PolicyDocument::insert(&db.pool, kind, &older).await.unwrap();

        let rows = PolicyDocument::find_all_oldest_first(&db.pool, kind)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, older.id);
        assert_eq!(rows[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_insert_if_empty_only_writes_first_row() {
        let db = DBService::new_in_memory().await.unwrap();
        let kind = PolicyDocumentKind::OfficePolicy;
        let data = UpsertPolicyDocument {
            hosting_date: "Jan 2024".to_string(),
            description: "<p>v1</p>".to_string(),
        };

        let first = PolicyDocument::insert_if_empty(&db.pool, kind, Uuid::new_v4(), &data, Utc::now())
            .await
            .unwrap();
        let second =
            PolicyDocument::insert_if_empty(&db.pool, kind, Uuid::new_v4(), &data, Utc::now())
                .await
                .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(PolicyDocument::count(&db.pool, kind).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let db = DBService::new_in_memory().await.unwrap();
        let doc = row("only office", Utc::now());
        PolicyDocument::insert(&db.pool, PolicyDocumentKind::OfficePolicy, &doc)
            .await
            .unwrap();

        for kind in [
            PolicyDocumentKind::PrivacyPolicy,
            PolicyDocumentKind::TermsOfService,
        ] {
            assert_eq!(PolicyDocument::count(&db.pool, kind).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_delete_many() {
        let db = DBService::new_in_memory().await.unwrap();
        let kind = PolicyDocumentKind::TermsOfService;
        let t0 = Utc::now();
        let docs: Vec<_> = (0..3)
            .map(|i| row(&format!("v{i}"), t0 + Duration::seconds(i)))
            .collect();
        for doc in &docs {
            PolicyDocument::insert(&db.pool, kind, doc).await.unwrap();
        }

        let deleted = PolicyDocument::delete_many(&db.pool, kind, &[docs[1].id, docs[2].id])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(
            PolicyDocument::delete_many(&db.pool, kind, &[]).await.unwrap(),
            0
        );

        let remaining = PolicyDocument::find_all_oldest_first(&db.pool, kind)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, docs[0].id);
        assert_eq!(remaining[0].hosting_date, "v0");
    }
}
