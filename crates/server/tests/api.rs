use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::{DBService, models::user::UserRole};
use deployment::Deployment;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use server::{DeploymentImpl, app, pages::PENDING_CONTENT};
use services::services::{
    auth::NewUser,
    config::{Config, MediaBackendConfig, MediaConfig},
    media::{LocalMediaStore, MediaService},
};
use tempfile::TempDir;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@clinic.test";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestApp {
    deployment: DeploymentImpl,
    media_dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let media_dir = tempfile::tempdir().unwrap();
        let config = Config {
            host: [127, 0, 0, 1].into(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: SecretString::from("t".repeat(32)),
            session_ttl_seconds: 3600,
            admin: None,
            media: MediaConfig {
                backend: MediaBackendConfig::Local {
                    root: media_dir.path().to_path_buf(),
                    public_path: "/media".to_string(),
                },
                max_upload_bytes: 64 * 1024,
            },
        };
        let db = DBService::new_in_memory().await.unwrap();
        let store =
            LocalMediaStore::new(media_dir.path().to_path_buf(), "/media".to_string()).unwrap();
        let media = MediaService::new(Arc::new(store), config.media.max_upload_bytes);
        let deployment = DeploymentImpl::from_parts(config, db, media);
        deployment
            .auth()
            .ensure_admin(ADMIN_EMAIL, &SecretString::from(ADMIN_PASSWORD.to_string()))
            .await
            .unwrap();
        Self {
            deployment,
            media_dir,
        }
    }

    fn router(&self) -> Router {
        app(self.deployment.clone())
    }

    async fn admin_token(&self) -> String {
        self.deployment
            .auth()
            .login(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap()
            .token
    }

    async fn editor_token(&self) -> String {
        self.deployment
            .auth()
            .create_user(NewUser {
                email: "editor@clinic.test".to_string(),
                name: "Editor".to_string(),
                password: SecretString::from("editor-password".to_string()),
                role: UserRole::Editor,
            })
            .await
            .unwrap();
        self.deployment
            .auth()
            .login("editor@clinic.test", "editor-password")
            .await
            .unwrap()
            .token
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn html(&self, uri: &str) -> (StatusCode, String) {
        let (status, body) = self.send(get(uri)).await;
        (status, String::from_utf8(body).unwrap())
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn authorized(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn multipart(uri: &str, token: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "clinic-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.json(get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_policy_document_absent_is_null() {
    let app = TestApp::new().await;
    let (status, body) = app.json(get("/api/privacy-policy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_policy_document_write_requires_admin() {
    let app = TestApp::new().await;
    let payload = json!({ "hostingDate": "2025-01-01", "description": "<p>Policy</p>" });

    let (status, _) = app
        .json(json_request("POST", "/api/office-policy", None, payload.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let editor = app.editor_token().await;
    let (status, body) = app
        .json(json_request("POST", "/api/office-policy", Some(&editor), payload))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "admin role required");
}

#[tokio::test]
async fn test_policy_document_validation_details() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (status, body) = app
        .json(json_request(
            "POST",
            "/api/terms-of-service",
            Some(&token),
            json!({ "hostingDate": "", "description": "" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["hostingDate"][0], "Hosting date is required");
    assert_eq!(body["details"]["description"][0], "Description is required");
}

#[tokio::test]
async fn test_policy_document_missing_field_is_reported() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (status, body) = app
        .json(json_request(
            "POST",
            "/api/office-policy",
            Some(&token),
            json!({ "hostingDate": "Jan 2024" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["description"][0], "Description is required");
    assert!(body["details"].get("hostingDate").is_none());
}

#[tokio::test]
async fn test_contact_form_empty_body_lists_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(json_request("POST", "/api/contact", None, json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["name"][0], "Name is required");
    assert_eq!(body["details"]["message"][0], "Message is required");
}

fn raw_json(uri: &str, token: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_unreadable_json_gets_stable_message() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .json(raw_json("/api/office-policy", &token, "{\"hostingDate\":"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Malformed JSON body");

    let (status, body) = app
        .json(raw_json(
            "/api/office-policy",
            &token,
            "{\"hostingDate\": 5, \"description\": \"<p>x</p>\"}",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body has invalid field types");
    assert!(!body["error"].as_str().unwrap().contains("line"));
    assert!(!body["error"].as_str().unwrap().contains("column"));
}

#[tokio::test]
async fn test_policy_document_save_and_replace() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, first) = app
        .json(json_request(
            "POST",
            "/api/privacy-policy",
            Some(&token),
            json!({ "hostingDate": "2025-01-01", "description": "<p>v1</p>" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Privacy Policy saved successfully");

    let (status, second) = app
        .json(json_request(
            "POST",
            "/api/privacy-policy",
            Some(&token),
            json!({ "hostingDate": "2025-06-01", "description": "<p>v2</p>" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["id"], first["data"]["id"]);

    let (_, current) = app.json(get("/api/privacy-policy")).await;
    assert_eq!(current["data"]["description"], "<p>v2</p>");
    assert_eq!(current["data"]["hostingDate"], "2025-06-01");

    // Other documents are unaffected.
    let (_, office) = app.json(get("/api/office-policy")).await;
    assert_eq!(office["data"], Value::Null);
}

#[tokio::test]
async fn test_policy_document_delete_is_not_allowed() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    for uri in ["/api/office-policy", "/api/privacy-policy", "/api/terms-of-service"] {
        let (status, body) = app.json(authorized("DELETE", uri, &token)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("not allowed"));
    }
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new().await;
    let response = app
        .router()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("clinic_session="));
    assert!(cookie.contains("HttpOnly"));

    let session_cookie = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/auth/session")
        .header(header::COOKIE, session_cookie)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["role"], "admin");

    let (status, _) = app.json(get("/api/auth/session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_from_bearer_token() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (status, body) = app
        .json(authorized("GET", "/api/auth/session", &token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);

    let (status, _) = app
        .json(authorized("GET", "/api/auth/session", "not-a-token"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": "nope" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid email or password");
}

#[tokio::test]
async fn test_services_hide_drafts_from_public() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    for (title, published) in [("Implants", true), ("Aligners", false)] {
        let (status, _) = app
            .json(json_request(
                "POST",
                "/api/services",
                Some(&token),
                json!({ "title": title, "description": "<p>Details</p>", "isPublished": published }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, public) = app.json(get("/api/services")).await;
    let titles: Vec<_> = public["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|service| service["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Implants"]);

    let (status, _) = app.json(get("/api/services?all=true")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, all) = app.json(authorized("GET", "/api/services?all=true", &token)).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let (status, _) = app.json(get("/api/services/slug/aligners")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .json(authorized("GET", "/api/services/slug/aligners", &token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .json(json_request(
            "POST",
            "/api/services",
            Some(&token),
            json!({ "title": "Implants", "description": "<p>Again</p>" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_service_image_upload_is_served() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (_, created) = app
        .json(json_request(
            "POST",
            "/api/services",
            Some(&token),
            json!({ "title": "Whitening", "description": "<p>Bright</p>" }),
        ))
        .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(multipart(
            &format!("/api/services/{id}/image"),
            &token,
            "smile.png",
            "image/png",
            b"\x89PNG\r\n\x1a\nfake",
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["imageUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/services/"));
    let key = body["data"]["imageKey"].as_str().unwrap();
    assert!(app.media_dir.path().join(key).exists());

    let (status, bytes) = app.send(get(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"\x89PNG\r\n\x1a\nfake");

    let (status, _) = app
        .json(multipart(
            &format!("/api/services/{id}/image"),
            &token,
            "notes.pdf",
            "application/pdf",
            b"%PDF-1.7",
        ))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_contact_form_and_inbox() {
    let app = TestApp::new().await;
    let (status, _) = app
        .json(json_request(
            "POST",
            "/api/contact",
            None,
            json!({ "name": "Ana", "email": "not-an-email", "message": "Hello" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(json_request(
            "POST",
            "/api/contact",
            None,
            json!({ "name": "Ana", "email": "ana@example.com", "message": "Do you take new patients?" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.json(get("/api/contact")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.admin_token().await;
    let (_, inbox) = app.json(authorized("GET", "/api/contact", &token)).await;
    let messages = inbox["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let id = messages[0]["id"].as_str().unwrap().to_string();

    let (_, unread) = app
        .json(authorized("GET", "/api/contact/unread-count", &token))
        .await;
    assert_eq!(unread["data"]["unread"], 1);

    let (status, read) = app
        .json(authorized("POST", &format!("/api/contact/{id}/read"), &token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["data"]["isRead"], true);

    let (_, unread) = app
        .json(authorized("GET", "/api/contact/unread-count", &token))
        .await;
    assert_eq!(unread["data"]["unread"], 0);
}

#[tokio::test]
async fn test_policy_page_placeholder_then_content() {
    let app = TestApp::new().await;
    let (status, html) = app.html("/terms-of-service").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Terms of Service"));
    assert!(html.contains(PENDING_CONTENT));

    let token = app.admin_token().await;
    app.json(json_request(
        "POST",
        "/api/terms-of-service",
        Some(&token),
        json!({ "hostingDate": "March 2025", "description": "<p>Be <strong>kind</strong>.</p>" }),
    ))
    .await;

    let (_, html) = app.html("/terms-of-service").await;
    assert!(!html.contains(PENDING_CONTENT));
    assert!(html.contains("<p>Be <strong>kind</strong>.</p>"));
    assert!(html.contains("March 2025"));
}

#[tokio::test]
async fn test_pages_escape_plain_text() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.json(json_request(
        "PUT",
        "/api/homepage-settings",
        Some(&token),
        json!({ "heroTitle": "Smiles <3 & more", "phone": "555-0100" }),
    ))
    .await;

    let (status, html) = app.html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<section class=\"hero\"><h1>Smiles &lt;3 &amp; more</h1></section>"));
    assert!(html.contains("<dt>Phone</dt><dd>555-0100</dd>"));
    assert!(!html.contains("<dt>Email</dt>"));
    assert!(html.contains("<title>Dental Clinic | Dental Clinic</title>"));
}

#[tokio::test]
async fn test_unknown_service_page_is_404() {
    let app = TestApp::new().await;
    let (status, html) = app.html("/services/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Page not found"));
}
