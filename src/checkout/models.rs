use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::document::Card;
use crate::messages::Tone;
use crate::payment::Plan;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub project_id: Uuid,
    pub plan: Plan,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub project_id: Uuid,
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfResponse {
    pub success: bool,
    #[schema(example = "/pdfs/cardcraft-classic-project-1.pdf")]
    pub pdf_url: String,
    pub page_count: usize,
    pub card_count: usize,
}

/// Guest checkout: everything needed to produce the PDF later.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestCheckoutRequest {
    #[serde(default = "default_guest_plan")]
    pub plan: Plan,
    pub email: Option<String>,
    #[serde(default)]
    pub guests: Vec<Card>,
    pub template: Option<String>,
    pub cards_per_page: Option<u8>,
    pub signer_names: Option<String>,
}

fn default_guest_plan() -> Plan {
    Plan::Premium
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSimpleRequest {
    pub payment_intent_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(default)]
    pub cards: Vec<Card>,
    pub template: Option<String>,
    pub cards_per_page: Option<u8>,
    pub signer_names: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub template: String,
    pub cards_per_page: u8,
    /// Cards shown on the preview sheet.
    pub preview_cards: usize,
    pub total_cards: usize,
    pub html: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestInput {
    #[serde(alias = "recipientName", alias = "recipient_name")]
    pub name: String,
    #[serde(default)]
    pub gift: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateMessagesRequest {
    #[serde(default)]
    pub guests: Vec<GuestInput>,
    /// Omit for prewritten messages picked by gift type.
    pub tone: Option<Tone>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMessageItem {
    pub recipient_name: String,
    pub gift: Option<String>,
    pub message: String,
    /// `prewritten`, `local` or the provider name.
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateMessagesResponse {
    pub messages: Vec<GeneratedMessageItem>,
}
