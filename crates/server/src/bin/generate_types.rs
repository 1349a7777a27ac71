//! Writes the TypeScript declarations of the API models used by the admin
//! frontend. Pass `--check` to fail instead of writing when the file is
//! out of date.

use std::{env, fs, path::PathBuf, process::ExitCode};

use ts_rs::TS;

fn generate_types_content() -> String {
    let header = "// This file was generated by `cargo run --bin generate_types`. Do not edit it by hand.\n\n";
    let decls = [
        utils::response::ApiResponse::<(), ()>::decl(),
        db::models::policy_document::PolicyDocumentKind::decl(),
        db::models::policy_document::PolicyDocument::decl(),
        db::models::policy_document::UpsertPolicyDocument::decl(),
        db::models::category::Category::decl(),
        db::models::category::CreateCategory::decl(),
        db::models::category::UpdateCategory::decl(),
        db::models::clinic_service::ClinicService::decl(),
        db::models::clinic_service::CreateClinicService::decl(),
        db::models::clinic_service::UpdateClinicService::decl(),
        db::models::technology::Technology::decl(),
        db::models::technology::CreateTechnology::decl(),
        db::models::technology::UpdateTechnology::decl(),
        db::models::member::Member::decl(),
        db::models::member::CreateMember::decl(),
        db::models::member::UpdateMember::decl(),
        db::models::first_visit::FirstVisit::decl(),
        db::models::first_visit::UpsertFirstVisit::decl(),
        db::models::patient_instruction::PatientInstruction::decl(),
        db::models::patient_instruction::CreatePatientInstruction::decl(),
        db::models::patient_instruction::UpdatePatientInstruction::decl(),
        db::models::homepage_settings::HomepageSettings::decl(),
        db::models::homepage_settings::UpsertHomepageSettings::decl(),
        db::models::contact_message::ContactMessage::decl(),
        db::models::contact_message::CreateContactMessage::decl(),
        db::models::user::UserRole::decl(),
        db::models::user::User::decl(),
        services::services::auth::Claims::decl(),
        services::services::auth::LoginRequest::decl(),
        services::services::auth::Session::decl(),
        services::services::media::StoredMedia::decl(),
        server::routes::contact::UnreadCount::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| {
            let trimmed = decl.trim_start();
            if trimmed.starts_with("export") {
                trimmed.to_string()
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{header}{body}\n")
}

fn main() -> ExitCode {
    let check = env::args().any(|arg| arg == "--check");
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared/types.ts");
    let content = generate_types_content();

    if check {
        return match fs::read_to_string(&path) {
            Ok(current) if current == content => {
                println!("shared/types.ts is up to date.");
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("shared/types.ts is out of date, run `cargo run --bin generate_types`.");
                ExitCode::FAILURE
            }
        };
    }

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create {}: {e}", dir.display());
            return ExitCode::FAILURE;
        }
    }
    match fs::write(&path, content) {
        Ok(()) => {
            println!("Generated {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write {}: {e}", path.display());
            ExitCode::FAILURE
        }
    }
}
