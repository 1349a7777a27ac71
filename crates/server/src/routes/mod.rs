use axum::Router;

use crate::DeploymentImpl;

pub mod auth;
pub mod categories;
pub mod clinic_services;
pub mod contact;
pub mod first_visit;
pub mod health;
pub mod homepage_settings;
pub mod members;
pub mod patient_instructions;
pub mod policy_documents;
pub mod technologies;
pub mod uploads;

/// Every JSON endpoint, mounted under `/api`.
pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .merge(health::router(deployment))
        .merge(auth::router(deployment))
        .merge(policy_documents::router(deployment))
        .merge(categories::router(deployment))
        .merge(clinic_services::router(deployment))
        .merge(technologies::router(deployment))
        .merge(members::router(deployment))
        .merge(first_visit::router(deployment))
        .merge(patient_instructions::router(deployment))
        .merge(homepage_settings::router(deployment))
        .merge(contact::router(deployment))
        .merge(uploads::router(deployment))
}
