//! Server-rendered public pages.
//!
//! Handlers only fetch content and lay it out. Plain text from the admin
//! area is escaped, rich-text bodies are written as stored.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use db::models::{
    clinic_service::ClinicService, homepage_settings::HomepageSettings,
    policy_document::PolicyDocumentKind,
};
use deployment::Deployment;
use pulldown_cmark_escape::{escape_href, escape_html};
use services::services::{content::ContentError, singleton_document::SingletonDocumentError};
use thiserror::Error;

use crate::DeploymentImpl;

pub const PENDING_CONTENT: &str = "This content is being prepared. Please check back soon.";

const SITE_NAME: &str = "Dental Clinic";

const NAV: [(&str, &str); 6] = [
    ("/", "Home"),
    ("/services", "Services"),
    ("/technology", "Technology"),
    ("/team", "Our Team"),
    ("/first-visit", "Your First Visit"),
    ("/patient-instructions", "Patient Instructions"),
];

#[derive(Debug, Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,
    #[error(transparent)]
    Content(ContentError),
    #[error(transparent)]
    SingletonDocument(#[from] SingletonDocumentError),
}

impl From<ContentError> for PageError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(_) => PageError::NotFound,
            other => PageError::Content(other),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, heading) = match &self {
            PageError::NotFound => (StatusCode::NOT_FOUND, "Page not found"),
            _ => {
                tracing::error!(error = %self, "Failed to render page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                )
            }
        };
        let body = format!("<section class=\"error\"><h1>{heading}</h1><p><a href=\"/\">Back to the home page</a></p></section>");
        (status, Html(layout(heading, None, &body))).into_response()
    }
}

type PageResult = Result<Html<String>, PageError>;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    escape_html(&mut out, text).ok();
    out
}

fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    escape_href(&mut out, url).ok();
    out
}

fn layout(title: &str, settings: Option<&HomepageSettings>, main: &str) -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | {SITE_NAME}</title>\n</head>\n<body>\n<header>\n<nav>\n<ul>\n",
        escape(title)
    );
    for (href, label) in NAV {
        html.push_str(&format!("<li><a href=\"{href}\">{label}</a></li>"));
    }
    html.push_str("</ul>\n</nav>\n</header>\n<main>\n");
    html.push_str(main);
    html.push_str("\n</main>\n");
    html.push_str(&footer(settings));
    html.push_str("</body>\n</html>\n");
    html
}

fn footer(settings: Option<&HomepageSettings>) -> String {
    let mut html = String::from("<footer>\n");
    if let Some(settings) = settings {
        let contact = [
            ("Phone", settings.phone.as_deref()),
            ("Email", settings.email.as_deref()),
            ("Address", settings.address.as_deref()),
            ("Opening hours", settings.opening_hours.as_deref()),
        ];
        html.push_str("<dl class=\"contact\">\n");
        for (label, value) in contact {
            if let Some(value) = value {
                html.push_str(&format!("<dt>{label}</dt><dd>{}</dd>", escape(value)));
            }
        }
        html.push_str("</dl>\n");
    }
    html.push_str("<ul class=\"legal\">\n");
    for kind in PolicyDocumentKind::ALL {
        html.push_str(&format!("<li><a href=\"/{kind}\">{}</a></li>", kind.title()));
    }
    html.push_str("</ul>\n</footer>\n");
    html
}

fn image(url: Option<&str>, alt: &str) -> String {
    match url {
        Some(url) => format!(
            "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
            escape_url(url),
            escape(alt)
        ),
        None => String::new(),
    }
}

fn pending() -> String {
    format!("<p class=\"pending\">{PENDING_CONTENT}</p>")
}

fn service_card(service: &ClinicService) -> String {
    let summary = service
        .summary
        .as_deref()
        .map(|summary| format!("<p>{}</p>", escape(summary)))
        .unwrap_or_default();
    format!(
        "<article class=\"service\">{}<h2><a href=\"/services/{}\">{}</a></h2>{summary}</article>\n",
        image(service.image_url.as_deref(), &service.title),
        escape_url(&service.slug),
        escape(&service.title),
    )
}

/// Wraps `main` in the site layout, with the footer taken from the homepage
/// settings.
async fn render(deployment: &DeploymentImpl, title: &str, main: &str) -> PageResult {
    let settings = deployment.homepage_settings().get().await?;
    Ok(Html(layout(title, settings.as_ref(), main)))
}

pub async fn home(State(deployment): State<DeploymentImpl>) -> PageResult {
    let settings = deployment.homepage_settings().get().await?;
    let services = deployment.clinic_services().list_published().await?;

    let mut main = String::new();
    match &settings {
        Some(settings) => {
            let subtitle = settings
                .hero_subtitle
                .as_deref()
                .map(|subtitle| format!("<p>{}</p>", escape(subtitle)))
                .unwrap_or_default();
            main.push_str(&format!(
                "<section class=\"hero\">{}<h1>{}</h1>{subtitle}</section>",
                image(settings.hero_image_url.as_deref(), &settings.hero_title),
                escape(&settings.hero_title),
            ));
        }
        None => {
            main.push_str(&format!("<section class=\"hero\"><h1>{SITE_NAME}</h1></section>"));
        }
    }
    if !services.is_empty() {
        main.push_str("<section class=\"services\"><h2>Our Services</h2>\n");
        for service in &services {
            main.push_str(&service_card(service));
        }
        main.push_str("</section>");
    }
    Ok(Html(layout(SITE_NAME, settings.as_ref(), &main)))
}

pub async fn services_index(State(deployment): State<DeploymentImpl>) -> PageResult {
    let categories = deployment.categories().list().await?;
    let services = deployment.clinic_services().list_published().await?;

    let mut main = String::from("<h1>Our Services</h1>\n");
    if services.is_empty() {
        main.push_str(&pending());
        return render(&deployment, "Services", &main).await;
    }
    for category in &categories {
        let in_category: Vec<_> = services
            .iter()
            .filter(|service| service.category_id == Some(category.id))
            .collect();
        if in_category.is_empty() {
            continue;
        }
        main.push_str(&format!(
            "<section id=\"{}\"><h2>{}</h2>",
            escape_url(&category.slug),
            escape(&category.name)
        ));
        for service in in_category {
            main.push_str(&service_card(service));
        }
        main.push_str("</section>\n");
    }
    let uncategorised: Vec<_> = services
        .iter()
        .filter(|service| {
            service
                .category_id
                .is_none_or(|id| !categories.iter().any(|category| category.id == id))
        })
        .collect();
    if !uncategorised.is_empty() {
        main.push_str("<section>");
        for service in uncategorised {
            main.push_str(&service_card(service));
        }
        main.push_str("</section>\n");
    }
    render(&deployment, "Services", &main).await
}

pub async fn service_detail(
    State(deployment): State<DeploymentImpl>,
    Path(slug): Path<String>,
) -> PageResult {
    let service = deployment.clinic_services().get_by_slug(&slug, false).await?;
    let main = format!(
        "<article class=\"service\"><h1>{}</h1>{}<div class=\"content\">{}</div></article>",
        escape(&service.title),
        image(service.image_url.as_deref(), &service.title),
        service.description,
    );
    render(&deployment, &service.title, &main).await
}

pub async fn technology(State(deployment): State<DeploymentImpl>) -> PageResult {
    let technologies = deployment.technologies().list().await?;
    let mut main = String::from("<h1>Our Technology</h1>\n");
    if technologies.is_empty() {
        main.push_str(&pending());
    }
    for technology in &technologies {
        main.push_str(&format!(
            "<article id=\"{}\">{}<h2>{}</h2><div class=\"content\">{}</div></article>",
            escape_url(&technology.slug),
            image(technology.image_url.as_deref(), &technology.name),
            escape(&technology.name),
            technology.description,
        ));
    }
    render(&deployment, "Technology", &main).await
}

pub async fn team(State(deployment): State<DeploymentImpl>) -> PageResult {
    let members = deployment.members().list().await?;
    let mut main = String::from("<h1>Our Team</h1>\n");
    if members.is_empty() {
        main.push_str(&pending());
    }
    for member in &members {
        let bio = member
            .bio
            .as_deref()
            .map(|bio| format!("<div class=\"bio\">{bio}</div>"))
            .unwrap_or_default();
        main.push_str(&format!(
            "<article class=\"member\">{}<h2>{}</h2><p class=\"position\">{}</p>{bio}</article>",
            image(member.image_url.as_deref(), &member.name),
            escape(&member.name),
            escape(&member.position),
        ));
    }
    render(&deployment, "Our Team", &main).await
}

pub async fn first_visit(State(deployment): State<DeploymentImpl>) -> PageResult {
    let main = match deployment.first_visit().get().await? {
        Some(page) => format!(
            "<article><h1>{}</h1>{}<div class=\"content\">{}</div></article>",
            escape(&page.title),
            image(page.image_url.as_deref(), &page.title),
            page.description,
        ),
        None => format!("<h1>Your First Visit</h1>{}", pending()),
    };
    render(&deployment, "Your First Visit", &main).await
}

pub async fn patient_instructions(State(deployment): State<DeploymentImpl>) -> PageResult {
    let instructions = deployment.patient_instructions().list().await?;
    let mut main = String::from("<h1>Patient Instructions</h1>\n");
    if instructions.is_empty() {
        main.push_str(&pending());
    }
    for instruction in &instructions {
        let attachment = if instruction.attachment_key.is_some() {
            format!(
                "<p><a href=\"/api/patient-instructions/{}/attachment\">Download PDF</a></p>",
                instruction.id
            )
        } else {
            String::new()
        };
        main.push_str(&format!(
            "<article id=\"{}\"><h2>{}</h2><div class=\"content\">{}</div>{attachment}</article>",
            escape_url(&instruction.slug),
            escape(&instruction.title),
            instruction.content,
        ));
    }
    render(&deployment, "Patient Instructions", &main).await
}

/// Office policy, privacy policy and terms of service pages. An unsaved
/// document shows the pending placeholder.
pub async fn policy_page(deployment: DeploymentImpl, kind: PolicyDocumentKind) -> PageResult {
    let document = deployment.policy_documents(kind).get().await?;
    let mut main = format!("<article class=\"policy\"><h1>{}</h1>", kind.title());
    match document {
        Some(document) => {
            main.push_str(&format!(
                "<p class=\"hosting-date\">{}</p><div class=\"content\">{}</div>",
                escape(&document.hosting_date),
                document.description,
            ));
        }
        None => main.push_str(&pending()),
    }
    main.push_str("</article>");
    render(&deployment, kind.title(), &main).await
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let router = Router::new()
        .route("/", get(home))
        .route("/services", get(services_index))
        .route("/services/{slug}", get(service_detail))
        .route("/technology", get(technology))
        .route("/team", get(team))
        .route("/first-visit", get(first_visit))
        .route("/patient-instructions", get(patient_instructions));

    PolicyDocumentKind::ALL
        .into_iter()
        .fold(router, |router, kind| {
            router.route(
                &format!("/{kind}"),
                get(move |State(deployment): State<DeploymentImpl>| policy_page(deployment, kind)),
            )
        })
}
