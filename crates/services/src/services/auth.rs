//! Credential sign-in and signed session tokens.

use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use db::models::user::{User, UserRole};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired session")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("a user with email '{0}' already exists")]
    EmailTaken(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("failed to issue session token: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),
}

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: SecretString,
    pub role: UserRole,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: SqlitePool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(pool: SqlitePool, secret: &SecretString, session_ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            pool,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            session_ttl: Duration::seconds(session_ttl_seconds),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let email = new_user.email.trim().to_string();
        if User::find_by_email(&self.pool, &email).await?.is_some() {
            return Err(AuthError::EmailTaken(email));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: new_user.name,
            password_hash: hash_password(new_user.password.expose_secret())?,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        let user = User::insert(&self.pool, &user).await?;
        info!(user_id = %user.id, role = %user.role, "Created user");
        Ok(user)
    }

    /// Creates the bootstrap administrator unless that email is already
    /// registered. An existing account is left untouched.
    pub async fn ensure_admin(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        if let Some(existing) = User::find_by_email(&self.pool, email).await? {
            if existing.role != UserRole::Admin {
                warn!(user_id = %existing.id, "Bootstrap admin email belongs to a non-admin user");
            }
            return Ok(existing);
        }
        self.create_user(NewUser {
            email: email.to_string(),
            name: "Administrator".to_string(),
            password: password.clone(),
            role: UserRole::Admin,
        })
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(user) = User::find_by_email(&self.pool, email).await? else {
            info!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            info!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        let (token, expires_at) = self.issue_token(&user, Utc::now())?;
        info!(user_id = %user.id, "User signed in");
        Ok(Session {
            token,
            expires_at,
            user,
        })
    }

    pub fn issue_token(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let expires_at = issued_at + self.session_ttl;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Token)?;
        Ok((token, expires_at))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }
}
