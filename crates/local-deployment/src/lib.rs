use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    auth::AuthService,
    config::{Config, MediaBackendConfig},
    media::MediaService,
};
use tracing::info;

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
    media: MediaService,
    auth: AuthService,
}

impl LocalDeployment {
    /// Connects the database, sets up the media backend and creates the
    /// bootstrap administrator when one is configured.
    pub async fn from_config(config: Config) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_url).await?;
        let media = MediaService::from_config(&config.media)?;
        let deployment = Self::from_parts(config, db, media);

        if let Some(admin) = &deployment.config.admin {
            let user = deployment
                .auth
                .ensure_admin(&admin.email, &admin.password)
                .await?;
            info!(user_id = %user.id, "Bootstrap administrator ready");
        }
        match &deployment.config.media.backend {
            MediaBackendConfig::Local { root, public_path } => {
                info!(root = %root.display(), public_path, "Serving media from local disk");
            }
            MediaBackendConfig::S3(s3) => {
                info!(bucket = %s3.bucket, region = %s3.region, "Storing media in S3");
            }
        }
        Ok(deployment)
    }

    pub fn from_parts(config: Config, db: DBService, media: MediaService) -> Self {
        let auth = AuthService::new(
            db.pool.clone(),
            &config.jwt_secret,
            config.session_ttl_seconds,
        );
        Self {
            config: Arc::new(config),
            db,
            media,
            auth,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        Self::from_config(Config::from_env()?).await
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn media(&self) -> &MediaService {
        &self.media
    }

    fn auth(&self) -> &AuthService {
        &self.auth
    }
}
