//! Stripe PaymentIntents over plain HTTPS.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use super::{PaymentError, PaymentGateway, PaymentIntent};

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeGateway {
    pub fn new(client: reqwest::Client, secret_key: impl Into<String>) -> Self {
        Self::with_base_url(client, secret_key, STRIPE_API_BASE)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            secret_key: secret_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn ensure_configured(&self) -> Result<(), PaymentError> {
        if self.secret_key.trim().is_empty() {
            return Err(PaymentError::NotConfigured);
        }
        Ok(())
    }

    async fn parse(response: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<PaymentIntent>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or(text);
        Err(PaymentError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Form fields for a new intent. Metadata keys are sorted for stable requests.
pub fn intent_form(amount_cents: i64, metadata: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), amount_cents.to_string()),
        ("currency".to_string(), "usd".to_string()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];
    let mut keys: Vec<&String> = metadata.keys().collect();
    keys.sort();
    for key in keys {
        form.push((format!("metadata[{}]", key), metadata[key].clone()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        self.ensure_configured()?;
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&intent_form(amount_cents, metadata))
            .send()
            .await?;

        let intent = Self::parse(response).await?;
        log::info!("Created payment intent {} for {} cents", intent.id, amount_cents);
        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        self.ensure_configured()?;
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.base_url, id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Self::parse(response).await
    }
}
