pub mod auth;
pub mod category;
pub mod clinic_service;
pub mod config;
pub mod contact;
pub mod content;
pub mod first_visit;
pub mod homepage_settings;
pub mod media;
pub mod member;
pub mod patient_instructions;
pub mod singleton_document;
pub mod technology;
