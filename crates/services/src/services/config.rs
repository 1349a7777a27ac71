//! Runtime configuration read from the process environment.

use std::{net::IpAddr, path::PathBuf, str::FromStr};

use secrecy::SecretString;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60 * 24;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("could not resolve the data directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub admin: Option<AdminBootstrap>,
    pub media: MediaConfig,
}

/// Credentials of the administrator created on first start.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub backend: MediaBackendConfig,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub enum MediaBackendConfig {
    /// Files under `root`, served by this process below `public_path`.
    Local { root: PathBuf, public_path: String },
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...).
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    /// Base of the public object URLs, typically a CDN in front of the bucket.
    pub public_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let host = parse_or(get("HOST"), "HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let path = utils::assets::asset_dir()?.join("clinic.sqlite");
                format!("sqlite://{}", path.display())
            }
        };

        let jwt_secret = require("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: "must be at least 32 characters".to_string(),
            });
        }
        let session_ttl_seconds = parse_or(
            get("SESSION_TTL_SECONDS"),
            "SESSION_TTL_SECONDS",
            DEFAULT_SESSION_TTL_SECONDS,
        )?;
        if session_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_SECONDS",
                reason: "must be positive".to_string(),
            });
        }

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        let backend = match get("MEDIA_BACKEND").as_deref().unwrap_or("local") {
            "local" => MediaBackendConfig::Local {
                root: match get("MEDIA_LOCAL_DIR") {
                    Some(dir) => PathBuf::from(dir),
                    None => utils::assets::asset_dir()?.join("media"),
                },
                public_path: normalize_public_path(
                    &get("MEDIA_PUBLIC_PATH").unwrap_or_else(|| "/media".to_string()),
                ),
            },
            "s3" => MediaBackendConfig::S3(S3Config {
                bucket: require("S3_BUCKET")?,
                region: require("S3_REGION")?,
                endpoint: get("S3_ENDPOINT"),
                access_key_id: require("S3_ACCESS_KEY_ID")?,
                secret_access_key: SecretString::from(require("S3_SECRET_ACCESS_KEY")?),
                public_base_url: get("S3_PUBLIC_BASE_URL"),
            }),
            other => {
                return Err(ConfigError::Invalid {
                    key: "MEDIA_BACKEND",
                    reason: format!("expected 'local' or 's3', got '{other}'"),
                });
            }
        };
        let max_upload_bytes = parse_or(
            get("MEDIA_MAX_UPLOAD_BYTES"),
            "MEDIA_MAX_UPLOAD_BYTES",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        Ok(Config {
            host,
            port,
            database_url,
            jwt_secret: SecretString::from(jwt_secret),
            session_ttl_seconds,
            admin,
            media: MediaConfig {
                backend,
                max_upload_bytes,
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

/// "media/" and "/media/" both become "/media".
fn normalize_public_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("MEDIA_LOCAL_DIR", "/tmp/media"),
        ])
        .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.media.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.admin.is_none());
        assert_eq!(config.jwt_secret.expose_secret(), SECRET);
        match config.media.backend {
            MediaBackendConfig::Local { root, public_path } => {
                assert_eq!(root, PathBuf::from("/tmp/media"));
                assert_eq!(public_path, "/media");
            }
            MediaBackendConfig::S3(_) => panic!("expected local backend"),
        }
    }

    #[test]
    fn test_jwt_secret_is_required() {
        let err = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = load(&[("JWT_SECRET", "short"), ("DATABASE_URL", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_SECRET", .. }));
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let err = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("MEDIA_BACKEND", "s3"),
            ("S3_REGION", "eu-west-1"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("S3_BUCKET")));
    }

    #[test]
    fn test_admin_bootstrap_needs_both_values() {
        let err = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("MEDIA_LOCAL_DIR", "/tmp/media"),
            ("ADMIN_EMAIL", "admin@clinic.test"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ADMIN_PASSWORD")));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("MEDIA_LOCAL_DIR", "/tmp/media"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_public_path_is_normalized() {
        assert_eq!(normalize_public_path("media/"), "/media");
        assert_eq!(normalize_public_path("/uploads/files/"), "/uploads/files");
    }
}
