//! Headless Chromium rendering engine.
//!
//! Writes the composed HTML to a temporary directory, invokes the browser's
//! print-to-PDF mode and reads the resulting file back.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::Semaphore;

use super::{check_pdf_bytes, PageFormat, RenderError, Renderer};
use crate::document::Document;

const INPUT_FILE: &str = "cards.html";
const OUTPUT_FILE: &str = "cards.pdf";

/// Renderer backed by a local Chromium/Chrome binary.
///
/// At most `max_concurrent` browser processes run at once; further calls wait
/// for a permit.
pub struct ChromiumRenderer {
    binary: PathBuf,
    timeout: Duration,
    permits: Semaphore,
}

impl ChromiumRenderer {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg("--run-all-compositor-stages-before-draw")
            .arg("--virtual-time-budget=10000")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run_browser(&self, temp_dir: &TempDir) -> Result<Vec<u8>, RenderError> {
        let input = temp_dir.path().join(INPUT_FILE);
        let output = temp_dir.path().join(OUTPUT_FILE);

        let child = self.command(&input, &output).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::EngineUnavailable(format!(
                    "browser binary '{}' not found",
                    self.binary.display()
                ))
            } else {
                RenderError::Io(e)
            }
        })?;

        let result = child.wait_with_output().await.map_err(RenderError::Io)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr)
                .lines()
                .last()
                .unwrap_or_default()
                .to_string();
            return Err(RenderError::EngineFailed {
                code: result.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let pdf = tokio::fs::read(&output).await.map_err(RenderError::Io)?;
        check_pdf_bytes(&pdf)?;
        Ok(pdf)
    }

    async fn render_with_permit(
        &self,
        document: &Document,
        format: PageFormat,
    ) -> Result<Vec<u8>, RenderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RenderError::EngineUnavailable("renderer is shutting down".to_string()))?;

        // Page size comes from the stylesheet's @page rule.
        log::debug!(
            "Rendering {} page(s) at {}x{}in with {}",
            document.page_count(),
            format.width_in,
            format.height_in,
            self.binary.display()
        );

        let temp_dir = tempfile::tempdir().map_err(RenderError::Io)?;
        tokio::fs::write(temp_dir.path().join(INPUT_FILE), document.to_html())
            .await
            .map_err(RenderError::Io)?;

        self.run_browser(&temp_dir).await
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    /// The timeout covers waiting for a permit as well as the browser run.
    /// A browser still running when it expires is killed on drop.
    async fn render(&self, document: &Document, format: PageFormat) -> Result<Vec<u8>, RenderError> {
        tokio::time::timeout(self.timeout, self.render_with_permit(document, format))
            .await
            .map_err(|_| RenderError::Timeout(self.timeout))?
    }
}
