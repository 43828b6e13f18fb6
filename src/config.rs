//! Environment configuration, loaded once at startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::document::Signature;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    pub chromium_path: PathBuf,
    pub render_timeout: Duration,
    pub render_concurrency: usize,
    pub pdf_dir: PathBuf,
    pub signer_names: String,
    pub temp_project_ttl: Duration,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_models: Vec<String>,
    pub allowed_origins: Vec<String>,
}

pub const DEFAULT_SIGNER_NAMES: &str = "The Happy Couple";
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(default),
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    /// Read configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not set, using default (NOT SECURE FOR PRODUCTION)");
            "cardcraft_default_secret_change_in_production".to_string()
        });

        let stripe_secret_key = lookup("STRIPE_SECRET_KEY").unwrap_or_default();
        if stripe_secret_key.is_empty() {
            log::warn!("STRIPE_SECRET_KEY not set, payments will be rejected");
        }

        let render_timeout_secs: u64 = parse_or("RENDER_TIMEOUT_SECS", lookup("RENDER_TIMEOUT_SECS"), 60)?;
        let ttl_secs: u64 = parse_or(
            "TEMP_PROJECT_TTL_SECS",
            lookup("TEMP_PROJECT_TTL_SECS"),
            24 * 60 * 60,
        )?;

        Ok(Self {
            port: parse_or("PORT", lookup("PORT"), 8080)?,
            database_url,
            jwt_secret,
            stripe_secret_key,
            chromium_path: lookup("CHROMIUM_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("chromium")),
            render_timeout: Duration::from_secs(render_timeout_secs),
            render_concurrency: parse_or("RENDER_CONCURRENCY", lookup("RENDER_CONCURRENCY"), 2)?,
            pdf_dir: lookup("PDF_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./pdfs")),
            signer_names: lookup("CARDCRAFT_SIGNER_NAMES")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SIGNER_NAMES.to_string()),
            temp_project_ttl: Duration::from_secs(ttl_secs),
            llm_api_url: lookup("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_api_key: lookup("LLM_API_KEY").filter(|v| !v.trim().is_empty()),
            llm_models: split_list(lookup("CARDCRAFT_LLM_MODELS")),
            allowed_origins: split_list(lookup("ALLOWED_ORIGINS")),
        })
    }

    /// Sign-off used when a request does not name the signers.
    pub fn default_signature(&self) -> Signature {
        Signature::new(self.signer_names.clone())
    }

    pub fn signature_for(&self, names: Option<&str>) -> Signature {
        match names.map(str::trim).filter(|n| !n.is_empty()) {
            Some(names) => Signature::new(names),
            None => self.default_signature(),
        }
    }

    /// Settings suitable for tests: no external services.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            database_url: "postgres://localhost/cardcraft_test".to_string(),
            jwt_secret: "test_secret".to_string(),
            stripe_secret_key: String::new(),
            chromium_path: PathBuf::from("chromium"),
            render_timeout: Duration::from_secs(5),
            render_concurrency: 1,
            pdf_dir: env::temp_dir().join("cardcraft-test-pdfs"),
            signer_names: DEFAULT_SIGNER_NAMES.to_string(),
            temp_project_ttl: Duration::from_secs(60),
            llm_api_url: DEFAULT_LLM_API_URL.to_string(),
            llm_api_key: None,
            llm_models: Vec::new(),
            allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.render_timeout, Duration::from_secs(60));
        assert_eq!(config.render_concurrency, 2);
        assert_eq!(config.temp_project_ttl, Duration::from_secs(86_400));
        assert_eq!(config.signer_names, DEFAULT_SIGNER_NAMES);
        assert!(config.llm_models.is_empty());
    }

    #[test]
    fn test_database_url_required() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_lists_are_split() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("CARDCRAFT_LLM_MODELS", "gpt-4o-mini, ,llama-3"),
            ("ALLOWED_ORIGINS", "https://a.example,https://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.llm_models, vec!["gpt-4o-mini", "llama-3"]);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_signature_for() {
        let config = AppConfig::for_tests();
        assert_eq!(config.signature_for(Some("  ")).names, DEFAULT_SIGNER_NAMES);
        assert_eq!(config.signature_for(Some("Sam & Alex")).names, "Sam & Alex");
    }
}
