//! Card documents - the data model, templates and the page composer.
//!
//! - `model` - cards, slots, pages and the composed document
//! - `template` - the closed set of visual templates
//! - `composer` - partitions cards into sheets
//! - `html` - markup + stylesheet emission for the renderer

pub mod composer;
pub mod escape;
pub mod html;
pub mod model;
pub mod template;

pub use composer::{compose, compose_preview, compose_with_template};
pub use model::{Card, Document, Page, PlacedCard, Signature, Slot, SlotContent};
pub use template::{StyleRole, Template, TemplateInfo};

use thiserror::Error;

/// Errors raised while composing a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("no cards to compose")]
    EmptyInput,
    #[error("card grid does not fit on the page")]
    LayoutOverflow,
    #[error("template '{0}' could not be resolved")]
    InvalidTemplate(String),
}
