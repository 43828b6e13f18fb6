//! Rendering - turning composed documents into PDF bytes.
//!
//! - `chromium` - headless Chromium renderer driven through its CLI
//! - `pipeline` - layout + compose + render with a single retry

pub mod chromium;
pub mod pipeline;

pub use chromium::ChromiumRenderer;
pub use pipeline::{GeneratedPdf, PdfError, PdfPipeline, PdfRequest};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::document::Document;
use crate::layout::PageGeometry;

/// Physical paper format handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_in: f64,
    pub height_in: f64,
}

impl PageFormat {
    pub const LETTER: PageFormat = PageFormat {
        width_in: 8.5,
        height_in: 11.0,
    };
}

impl From<PageGeometry> for PageFormat {
    fn from(page: PageGeometry) -> Self {
        Self {
            width_in: page.width_in,
            height_in: page.height_in,
        }
    }
}

/// Errors reported by a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer timed out after {0:?}")]
    Timeout(Duration),
    #[error("render engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("render engine exited with status {code}: {stderr}")]
    EngineFailed { code: i32, stderr: String },
    #[error("renderer I/O failed: {0}")]
    Io(#[source] std::io::Error),
    #[error("renderer produced invalid output: {0}")]
    InvalidOutput(String),
}

impl RenderError {
    /// Short machine-readable kind for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::Timeout(_) => "RenderTimeout",
            RenderError::EngineUnavailable(_) => "RenderEngineUnavailable",
            RenderError::EngineFailed { .. } => "RenderEngineFailed",
            RenderError::Io(_) => "RenderIo",
            RenderError::InvalidOutput(_) => "RenderInvalidOutput",
        }
    }
}

/// Rasterizes a composed document into a multi-page PDF.
///
/// Implementations are not assumed to be safe for unbounded concurrent use;
/// each one documents and enforces its own limit.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, document: &Document, format: PageFormat) -> Result<Vec<u8>, RenderError>;
}

/// Reject byte streams that are obviously not a PDF.
pub fn check_pdf_bytes(bytes: &[u8]) -> Result<(), RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::InvalidOutput("empty PDF".to_string()));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(RenderError::InvalidOutput("missing %PDF header".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_pdf_bytes() {
        assert!(check_pdf_bytes(b"%PDF-1.7\n...").is_ok());
        assert!(matches!(
            check_pdf_bytes(b""),
            Err(RenderError::InvalidOutput(_))
        ));
        assert!(matches!(
            check_pdf_bytes(b"<html>"),
            Err(RenderError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_render_error_kinds() {
        assert_eq!(
            RenderError::Timeout(Duration::from_secs(30)).kind(),
            "RenderTimeout"
        );
        assert_eq!(
            RenderError::EngineUnavailable("missing".into()).kind(),
            "RenderEngineUnavailable"
        );
    }

    #[test]
    fn test_page_format_from_geometry() {
        assert_eq!(PageFormat::from(PageGeometry::LETTER), PageFormat::LETTER);
    }
}
