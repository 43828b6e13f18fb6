//! PDF generation pipeline: layout, composition and rendering.
//!
//! Layout and composition failures are caller errors and are returned at
//! once. A failed render is retried a single time before the request fails.

use std::sync::Arc;
use thiserror::Error;

use super::{PageFormat, RenderError, Renderer};
use crate::document::escape::sanitize_filename;
use crate::document::{compose, Card, ComposeError, Signature};
use crate::layout::{compute_layout, LayoutError};

const USER_FAILURE_MESSAGE: &str = "We could not generate your cards, please try again.";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("PDF generation failed after retry: {0}")]
    Render(#[source] RenderError),
}

impl PdfError {
    /// True when the request itself was bad and retrying cannot help.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, PdfError::Layout(_) | PdfError::Compose(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PdfError::Layout(LayoutError::InvalidConfiguration(_)) => "InvalidConfiguration",
            PdfError::Compose(ComposeError::EmptyInput) => "EmptyInput",
            PdfError::Compose(ComposeError::LayoutOverflow) => "LayoutOverflow",
            PdfError::Compose(ComposeError::InvalidTemplate(_)) => "InvalidTemplate",
            PdfError::Render(err) => err.kind(),
        }
    }

    /// Message safe to show to the customer.
    pub fn user_message(&self) -> String {
        if self.is_caller_error() {
            self.to_string()
        } else {
            USER_FAILURE_MESSAGE.to_string()
        }
    }
}

/// Everything needed to produce one PDF.
#[derive(Debug, Clone, Copy)]
pub struct PdfRequest<'a> {
    pub cards: &'a [Card],
    pub template_id: &'a str,
    pub cards_per_page: u8,
    pub signature: &'a Signature,
    /// Base used for the output file name.
    pub name: &'a str,
}

/// Result of a successful PDF generation.
#[derive(Debug)]
pub struct GeneratedPdf {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub page_count: usize,
    pub card_count: usize,
}

#[derive(Clone)]
pub struct PdfPipeline {
    renderer: Arc<dyn Renderer>,
}

impl PdfPipeline {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }

    pub async fn generate(&self, request: PdfRequest<'_>) -> Result<GeneratedPdf, PdfError> {
        let layout = compute_layout(request.cards_per_page)?;
        let document = compose(
            request.cards,
            request.template_id,
            &layout,
            request.signature,
        )?;
        let format = PageFormat::from(layout.page);

        let pdf = match self.renderer.render(&document, format).await {
            Ok(pdf) => pdf,
            Err(first) => {
                log::warn!(
                    "Render failed ({}), retrying once: {}",
                    first.kind(),
                    first
                );
                self.renderer
                    .render(&document, format)
                    .await
                    .map_err(PdfError::Render)?
            }
        };

        let filename = format!(
            "cardcraft-{}-{}.pdf",
            document.template.id(),
            sanitize_filename(request.name, "cards")
        );

        log::info!(
            "Generated {} ({} cards, {} pages, {} bytes)",
            filename,
            document.card_count(),
            document.page_count(),
            pdf.len()
        );

        Ok(GeneratedPdf {
            filename,
            pdf,
            page_count: document.page_count(),
            card_count: document.card_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails the first `failures` calls, then returns a stub PDF.
    struct FlakyRenderer {
        failures: usize,
        calls: AtomicUsize,
    }

    impl FlakyRenderer {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Renderer for FlakyRenderer {
        async fn render(
            &self,
            document: &Document,
            _format: PageFormat,
        ) -> Result<Vec<u8>, RenderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(RenderError::Timeout(Duration::from_secs(30)));
            }
            Ok(format!("%PDF-1.7 pages={}", document.page_count()).into_bytes())
        }
    }

    fn cards() -> Vec<Card> {
        vec![
            Card::new("Ann", Some("Vase"), "Thanks!"),
            Card::new("Bob", None, "Cheers"),
        ]
    }

    fn request<'a>(cards: &'a [Card], signature: &'a Signature, k: u8) -> PdfRequest<'a> {
        PdfRequest {
            cards,
            template_id: "classic",
            cards_per_page: k,
            signature,
            name: "Ann & Bob",
        }
    }

    #[tokio::test]
    async fn test_generate_success() {
        let renderer = Arc::new(FlakyRenderer::new(0));
        let pipeline = PdfPipeline::new(renderer.clone());
        let cards = cards();
        let signature = Signature::new("A and B");

        let pdf = pipeline.generate(request(&cards, &signature, 4)).await.unwrap();
        assert_eq!(pdf.page_count, 1);
        assert_eq!(pdf.card_count, 2);
        assert_eq!(pdf.filename, "cardcraft-classic-ann-bob.pdf");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_render_retried_once() {
        let renderer = Arc::new(FlakyRenderer::new(1));
        let pipeline = PdfPipeline::new(renderer.clone());
        let cards = cards();
        let signature = Signature::new("A and B");

        assert!(pipeline.generate(request(&cards, &signature, 2)).await.is_ok());
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_render_fails_after_second_attempt() {
        let renderer = Arc::new(FlakyRenderer::new(5));
        let pipeline = PdfPipeline::new(renderer.clone());
        let cards = cards();
        let signature = Signature::new("A and B");

        let err = pipeline
            .generate(request(&cards, &signature, 4))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "RenderTimeout");
        assert!(!err.is_caller_error());
        assert_eq!(err.user_message(), USER_FAILURE_MESSAGE);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_caller_errors_skip_renderer() {
        let renderer = Arc::new(FlakyRenderer::new(0));
        let pipeline = PdfPipeline::new(renderer.clone());
        let signature = Signature::new("A and B");

        let err = pipeline
            .generate(request(&cards(), &signature, 3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidConfiguration");
        assert!(err.is_caller_error());

        let err = pipeline
            .generate(request(&[], &signature, 4))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "EmptyInput");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }
}
