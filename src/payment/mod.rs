//! Plans and the payment gateway contract.

pub mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Starter,
    Premium,
    Unlimited,
}

impl Plan {
    /// Price in US cents.
    pub fn amount_cents(self) -> i64 {
        match self {
            Plan::Starter => 1900,
            Plan::Premium => 3900,
            Plan::Unlimited => 7900,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Starter => "starter",
            Plan::Premium => "premium",
            Plan::Unlimited => "unlimited",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starter" => Ok(Plan::Starter),
            "premium" => Ok(Plan::Premium),
            "unlimited" => Ok(Plan::Unlimited),
            other => Err(PaymentError::InvalidPlan(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn succeeded(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("unknown plan '{0}'")]
    InvalidPlan(String),
    #[error("payment gateway is not configured")]
    NotConfigured,
    #[error("payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("payment has not completed (status {0:?})")]
    NotSucceeded(PaymentStatus),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        amount_cents: i64,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError>;

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError>;

    /// Fetch the intent and require that it succeeded.
    async fn verify_succeeded(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let intent = self.retrieve_intent(id).await?;
        if intent.status.succeeded() {
            Ok(intent)
        } else {
            Err(PaymentError::NotSucceeded(intent.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prices() {
        assert_eq!(Plan::Starter.amount_cents(), 1900);
        assert_eq!(Plan::Premium.amount_cents(), 3900);
        assert_eq!(Plan::Unlimited.amount_cents(), 7900);
    }

    #[test]
    fn test_plan_parse() {
        assert_eq!("Premium".parse::<Plan>().unwrap(), Plan::Premium);
        assert!(matches!(
            "gold".parse::<Plan>(),
            Err(PaymentError::InvalidPlan(p)) if p == "gold"
        ));
    }

    #[test]
    fn test_status_deserialize() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"id":"pi_1","client_secret":"s","status":"succeeded","amount":1900}"#,
        )
        .unwrap();
        assert!(intent.status.succeeded());

        let odd: PaymentStatus = serde_json::from_str(r#""something_new""#).unwrap();
        assert_eq!(odd, PaymentStatus::Unknown);
    }
}
