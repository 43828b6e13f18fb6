//! Multipart guest-list upload.

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use sanitize_filename::sanitize;

use crate::document::Card;
use crate::guests::{parse_guest_cards, GuestCsvError};
use crate::ErrorResponse;

/// Uploaded guest lists larger than this are refused.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("No file field in upload")]
    MissingFile,
    #[error("Upload exceeds {} bytes", MAX_UPLOAD_BYTES)]
    TooLarge,
    #[error(transparent)]
    Csv(#[from] GuestCsvError),
}

impl From<UploadError> for HttpResponse {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::TooLarge => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &error.to_string())),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string())),
        }
    }
}

/// Read the `file` field of a multipart body and parse it as a guest list.
pub async fn read_guest_upload(mut multipart: Multipart) -> Result<Vec<Card>, UploadError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| UploadError::FieldError(e.to_string()))?;
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| UploadError::FieldError("Content disposition not found".to_string()))?;
        let name = content_disposition.get_name().unwrap_or_default().to_string();
        let filename = content_disposition.get_filename().map(sanitize);

        if name != "file" {
            // Drain fields we do not use.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| UploadError::FieldError(e.to_string()))?;
            }
            continue;
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| UploadError::FieldError(e.to_string()))?;
            if buffer.len() + data.len() > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge);
            }
            buffer.extend_from_slice(&data);
        }
        log::info!(
            "Received guest list {} ({} bytes)",
            filename.as_deref().unwrap_or("<unnamed>"),
            buffer.len()
        );
        file_data = Some(buffer);
    }

    let bytes = file_data.ok_or(UploadError::MissingFile)?;
    Ok(parse_guest_cards(&bytes)?)
}
