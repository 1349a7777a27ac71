pub mod category;
pub mod clinic_service;
pub mod contact_message;
pub mod first_visit;
pub mod homepage_settings;
pub mod member;
pub mod patient_instruction;
pub mod policy_document;
pub mod technology;
pub mod user;
