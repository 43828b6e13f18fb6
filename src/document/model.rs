use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::template::Template;
use crate::layout::LayoutSpec;

/// One recipient's thank-you card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    #[serde(alias = "recipientName", alias = "name")]
    #[schema(example = "Grandma Betty")]
    pub recipient_name: String,
    #[serde(default)]
    #[schema(example = "Handmade quilt")]
    pub gift: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl Card {
    pub fn new(
        recipient_name: impl Into<String>,
        gift: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            gift: gift.filter(|g| !g.trim().is_empty()).map(str::to_string),
            message: message.into(),
        }
    }
}

/// Sign-off block printed at the bottom of every card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Signature {
    #[schema(example = "With appreciation,")]
    pub closing: String,
    #[schema(example = "Collin and Annika")]
    pub names: String,
}

impl Signature {
    pub const DEFAULT_CLOSING: &'static str = "With appreciation,";

    pub fn new(names: impl Into<String>) -> Self {
        Self {
            closing: Self::DEFAULT_CLOSING.to_string(),
            names: names.into(),
        }
    }
}

/// A card placed on a sheet, with its position in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedCard {
    pub index: usize,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlotContent {
    Card(PlacedCard),
    /// Empty grid cell kept so every sheet cuts into equal cards.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub left_in: f64,
    pub top_in: f64,
    pub content: SlotContent,
}

impl Slot {
    pub fn card(&self) -> Option<&PlacedCard> {
        match &self.content {
            SlotContent::Card(placed) => Some(placed),
            SlotContent::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, SlotContent::Placeholder)
    }
}

/// One physical sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based sheet number.
    pub number: usize,
    pub slots: Vec<Slot>,
}

impl Page {
    pub fn cards(&self) -> impl Iterator<Item = &PlacedCard> {
        self.slots.iter().filter_map(Slot::card)
    }

    pub fn placeholder_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_placeholder()).count()
    }
}

/// Composed, render-ready document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub template: Template,
    pub layout: LayoutSpec,
    pub signature: Signature,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All real cards in document order.
    pub fn cards(&self) -> impl Iterator<Item = &PlacedCard> {
        self.pages.iter().flat_map(Page::cards)
    }

    pub fn card_count(&self) -> usize {
        self.cards().count()
    }
}
