use async_trait::async_trait;
use db::{DBService, models::policy_document::PolicyDocumentKind};
use services::services::{
    auth::{AuthError, AuthService},
    category::CategoryService,
    clinic_service::ClinicServiceService,
    config::{Config, ConfigError},
    contact::ContactService,
    first_visit::FirstVisitService,
    homepage_settings::HomepageSettingsService,
    media::{MediaError, MediaService},
    member::MemberService,
    patient_instructions::PatientInstructionsService,
    singleton_document::SingletonDocumentService,
    technology::TechnologyService,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Everything a request handler needs. The content services are cheap
/// handles over the shared pool and media store, built on demand.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    fn media(&self) -> &MediaService;

    fn auth(&self) -> &AuthService;

    fn policy_documents(&self, kind: PolicyDocumentKind) -> SingletonDocumentService {
        SingletonDocumentService::new(self.db().pool.clone(), kind)
    }

    fn categories(&self) -> CategoryService {
        CategoryService::new(self.db().pool.clone())
    }

    fn clinic_services(&self) -> ClinicServiceService {
        ClinicServiceService::new(self.db().pool.clone(), self.media().clone())
    }

    fn technologies(&self) -> TechnologyService {
        TechnologyService::new(self.db().pool.clone(), self.media().clone())
    }

    fn members(&self) -> MemberService {
        MemberService::new(self.db().pool.clone(), self.media().clone())
    }

    fn first_visit(&self) -> FirstVisitService {
        FirstVisitService::new(self.db().pool.clone(), self.media().clone())
    }

    fn patient_instructions(&self) -> PatientInstructionsService {
        PatientInstructionsService::new(self.db().pool.clone(), self.media().clone())
    }

    fn homepage_settings(&self) -> HomepageSettingsService {
        HomepageSettingsService::new(self.db().pool.clone(), self.media().clone())
    }

    fn contact(&self) -> ContactService {
        ContactService::new(self.db().pool.clone())
    }
}
