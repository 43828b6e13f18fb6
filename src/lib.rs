use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod checkout;
pub mod config;
pub mod db;
pub mod document;
pub mod guests;
pub mod layout;
pub mod messages;
pub mod payment;
pub mod projects;
pub mod render;
pub mod store;

pub use crate::config::AppConfig;
pub use crate::db::AppState;

use crate::document::{Template, TemplateInfo};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

/// Service health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Service",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Template catalogue
#[utoipa::path(
    get,
    path = "/api/templates",
    tag = "Service",
    responses((status = 200, description = "Available templates", body = Vec<TemplateInfo>))
)]
pub async fn list_templates() -> impl Responder {
    let templates: Vec<TemplateInfo> = Template::ALL.iter().copied().map(TemplateInfo::from).collect();
    HttpResponse::Ok().json(templates)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::projects::handlers::create_project,
        crate::projects::handlers::list_projects,
        crate::projects::handlers::upload_guests,
        crate::projects::handlers::get_cards,
        crate::projects::handlers::count_cards,
        crate::projects::handlers::update_card,
        crate::projects::handlers::regenerate_messages,
        crate::checkout::handlers::create_payment,
        crate::checkout::handlers::confirm_payment,
        crate::checkout::handlers::download_pdf,
        crate::checkout::handlers::create_payment_intent,
        crate::checkout::handlers::confirm_payment_simple,
        crate::checkout::handlers::preview,
        crate::checkout::handlers::generate_messages,
        health,
        list_templates
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            TemplateInfo,
            document::Card,
            auth::model::Credentials,
            auth::model::TokenResponse,
            auth::model::UserInfo,
            projects::models::Project,
            projects::models::CardRecord,
            projects::models::CreateProjectRequest,
            projects::models::CardsResponse,
            projects::models::CountResponse,
            projects::models::UpdateCardRequest,
            projects::models::SuccessResponse,
            projects::models::UploadResponse,
            projects::models::RegenerateMessagesRequest,
            projects::models::RegenerateMessagesResponse,
            checkout::models::CreatePaymentRequest,
            checkout::models::ClientSecretResponse,
            checkout::models::ConfirmPaymentRequest,
            checkout::models::PdfResponse,
            checkout::models::GuestCheckoutRequest,
            checkout::models::ConfirmSimpleRequest,
            checkout::models::PreviewRequest,
            checkout::models::PreviewResponse,
            checkout::models::GuestInput,
            checkout::models::GenerateMessagesRequest,
            checkout::models::GeneratedMessageItem,
            checkout::models::GenerateMessagesResponse,
            messages::Tone,
            payment::Plan,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration and login."),
        (name = "Projects", description = "Card projects, guest uploads and messages."),
        (name = "Checkout", description = "Payment, PDF generation and download."),
        (name = "Guest Checkout", description = "Account-free preview and checkout."),
        (name = "Service", description = "Health and template catalogue.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

/// Mount every `/api` route on `cfg`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::handlers::config)
        .configure(projects::handlers::config)
        .configure(checkout::handlers::config)
        .route("/templates", web::get().to(list_templates))
        .route("/health", web::get().to(health));
}

fn build_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600);

    if allowed_origins.is_empty() {
        cors = cors
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://127.0.0.1:8080");
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.supports_credentials()
}

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let port = config.port;
    let pdf_dir = config.pdf_dir.clone();
    let allowed_origins = config.allowed_origins.clone();

    std::fs::create_dir_all(&pdf_dir)?;

    let app_state = match AppState::new(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to connect to database. Please check DATABASE_URL in .env and ensure the database is running. Error: {}", e);
            std::process::exit(1);
        }
    };

    let prometheus = match PrometheusMetricsBuilder::new("cardcraft_server")
        .endpoint("/metrics")
        .build()
    {
        Ok(prometheus) => prometheus,
        Err(e) => {
            log::error!("Failed to create Prometheus metrics middleware: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting CardCraft server at http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(build_cors(&allowed_origins))
            .app_data(app_state.clone())
            .service(web::scope("/api").configure(configure_api))
            .service(actix_files::Files::new(checkout::PDF_URL_PREFIX, pdf_dir.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
