use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::document::Card;
use crate::layout::CardsPerPage;
use crate::messages::Tone;

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_PAID: &str = "paid";
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_COMPLETED: &str = "completed";

/// Cards visible on an unpaid project in preview mode.
pub const PREVIEW_CARD_LIMIT: i64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "classic")]
    pub template: String,
    #[schema(example = 4)]
    pub cards_per_page: i16,
    pub signer_names: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub payment_id: Option<String>,
    pub pdf_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PAYMENT_PAID
    }

    /// Stored density, or the default when the column holds something odd.
    pub fn density(&self) -> CardsPerPage {
        u8::try_from(self.cards_per_page)
            .ok()
            .and_then(|n| CardsPerPage::try_from(n).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub recipient_name: String,
    pub gift: Option<String>,
    pub message: String,
    pub sort_order: i32,
}

impl From<CardRecord> for Card {
    fn from(record: CardRecord) -> Self {
        Card::new(record.recipient_name, record.gift.as_deref(), record.message)
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[schema(example = "romantic")]
    pub template: Option<String>,
    #[schema(example = 4)]
    pub cards_per_page: Option<u8>,
    #[schema(example = "Collin and Annika")]
    pub signer_names: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CardsQuery {
    pub preview: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardsResponse {
    pub cards: Vec<CardRecord>,
    pub total: usize,
    pub is_preview: bool,
    pub is_paid: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCardRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Multipart body of a guest list upload (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadGuestsRequest {
    #[allow(unused)]
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub count: usize,
}

/// Rewrite every card's message: prewritten by gift type, or generated in a tone.
#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct RegenerateMessagesRequest {
    pub tone: Option<Tone>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegenerateMessagesResponse {
    pub updated: usize,
}
