//! Database module - AppState and database operations
//!
//! - `users` - account lookups and creation
//! - `projects` - projects and their cards

mod projects;
mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::messages::{chain_from_config, FallbackChain};
use crate::payment::{PaymentGateway, StripeGateway};
use crate::render::{ChromiumRenderer, PdfPipeline, Renderer};
use crate::store::{MokaTempProjectStore, TempProjectStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub http_client: reqwest::Client,
    pub pdf: PdfPipeline,
    pub payments: Arc<dyn PaymentGateway>,
    pub messages: FallbackChain,
    pub temp_projects: Arc<dyn TempProjectStore>,
}

fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(900))
        .timeout(Duration::from_secs(30))
        .user_agent("cardcraft-server/1.0")
        .build()
}

impl AppState {
    /// Connect to the database, run migrations and wire up the real collaborators.
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations applied");

        let http_client = build_http_client()?;
        let renderer: Arc<dyn Renderer> = Arc::new(ChromiumRenderer::new(
            config.chromium_path.clone(),
            config.render_timeout,
            config.render_concurrency,
        ));
        let payments: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(
            http_client.clone(),
            config.stripe_secret_key.clone(),
        ));
        let messages = chain_from_config(&config, http_client.clone());
        let temp_projects: Arc<dyn TempProjectStore> =
            Arc::new(MokaTempProjectStore::new(config.temp_project_ttl));

        Ok(AppState {
            pool,
            config: Arc::new(config),
            http_client,
            pdf: PdfPipeline::new(renderer),
            payments,
            messages,
            temp_projects,
        })
    }

    /// Assemble state from injected parts. The pool may be lazy.
    pub fn with_parts(
        pool: PgPool,
        config: AppConfig,
        renderer: Arc<dyn Renderer>,
        payments: Arc<dyn PaymentGateway>,
        messages: FallbackChain,
    ) -> Self {
        let temp_projects: Arc<dyn TempProjectStore> =
            Arc::new(MokaTempProjectStore::new(config.temp_project_ttl));
        AppState {
            pool,
            config: Arc::new(config),
            http_client: reqwest::Client::new(),
            pdf: PdfPipeline::new(renderer),
            payments,
            messages,
            temp_projects,
        }
    }
}
