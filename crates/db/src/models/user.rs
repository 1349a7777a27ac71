use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize, TS, Display, EnumString,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, email, name, password_hash, role, created_at, updated_at";

impl User {
    /// Case-insensitive on `email`.
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn insert(pool: &SqlitePool, user: &User) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(pool)
        .await
    }

    pub async fn update_password(
        pool: &SqlitePool,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .bind(updated_at)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_role(pool: &SqlitePool, role: UserRole) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let db = DBService::new_in_memory().await.unwrap();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "Admin@Clinic.test".to_string(),
            name: "Admin".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        };
        User::insert(&db.pool, &user).await.unwrap();

        let found = User::find_by_email(&db.pool, "admin@clinic.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, UserRole::Admin);
        assert_eq!(User::count_by_role(&db.pool, UserRole::Admin).await.unwrap(), 1);
        assert_eq!(User::count_by_role(&db.pool, UserRole::Editor).await.unwrap(), 0);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "e@x.test".to_string(),
            name: "E".to_string(),
            password_hash: "secret".to_string(),
            role: UserRole::from_str("editor").unwrap(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "editor");
    }
}
