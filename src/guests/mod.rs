//! Guest list ingestion - CSV parsing, row validation and stock messages.
//!
//! Expected columns (case-insensitive): `Name`, `Gift`, `Message` (optional).

pub mod prewritten;
pub mod validation;

pub use prewritten::{default_message, prewritten_message, GiftKind};
pub use validation::{ValidationError, ValidationErrors};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::document::Card;

#[derive(Debug, Error)]
pub enum GuestCsvError {
    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Invalid(ValidationErrors),
}

/// One parsed guest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GuestRow {
    pub name: String,
    pub gift: Option<String>,
    pub message: Option<String>,
}

impl GuestRow {
    /// Card for this guest, using the stock message when none was supplied.
    pub fn into_card(self) -> Card {
        let message = match self.message {
            Some(message) => message,
            None => default_message(self.gift.as_deref()),
        };
        Card::new(self.name, self.gift.as_deref(), message)
    }
}

struct Columns {
    name: usize,
    gift: usize,
    message: Option<usize>,
}

fn find_columns(headers: &csv::StringRecord) -> Result<Columns, ValidationErrors> {
    let position = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(wanted))
    };

    let mut errors = ValidationErrors::new();
    let name = position("name");
    let gift = position("gift");
    if name.is_none() {
        errors.add(ValidationError::missing_column("Name"));
    }
    if gift.is_none() {
        errors.add(ValidationError::missing_column("Gift"));
    }

    match (name, gift) {
        (Some(name), Some(gift)) => Ok(Columns {
            name,
            gift,
            message: position("message"),
        }),
        _ => Err(errors),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse an uploaded guest list. Row order is preserved.
pub fn parse_guest_csv(bytes: &[u8]) -> Result<Vec<GuestRow>, GuestCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let columns = find_columns(&headers).map_err(GuestCsvError::Invalid)?;

    let mut rows = Vec::new();
    let mut errors = ValidationErrors::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);

        match non_empty(record.get(columns.name)) {
            Some(name) => rows.push(GuestRow {
                name,
                gift: non_empty(record.get(columns.gift)),
                message: columns.message.and_then(|idx| non_empty(record.get(idx))),
            }),
            None => errors.add(ValidationError::empty_field("Name", line)),
        }
    }

    if rows.is_empty() && errors.is_empty() {
        errors.add(ValidationError::no_rows());
    }
    errors.into_result().map_err(GuestCsvError::Invalid)?;

    Ok(rows)
}

/// Parse an uploaded guest list straight into cards.
pub fn parse_guest_cards(bytes: &[u8]) -> Result<Vec<Card>, GuestCsvError> {
    Ok(parse_guest_csv(bytes)?
        .into_iter()
        .map(GuestRow::into_card)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_csv() {
        let csv = "Name,Gift,Message\nAnn,Vase,Thanks!\nBob,,\n";
        let rows = parse_guest_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ann");
        assert_eq!(rows[0].gift.as_deref(), Some("Vase"));
        assert_eq!(rows[0].message.as_deref(), Some("Thanks!"));
        assert_eq!(rows[1].gift, None);
        assert_eq!(rows[1].message, None);
    }

    #[test]
    fn test_headers_are_case_insensitive_and_message_optional() {
        let csv = "\u{feff}gift , NAME\n\"Wine glasses, set of 4\",Emily and David Chen\n";
        let rows = parse_guest_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].name, "Emily and David Chen");
        assert_eq!(rows[0].gift.as_deref(), Some("Wine glasses, set of 4"));
    }

    #[test]
    fn test_missing_columns_reported() {
        let err = parse_guest_csv(b"Guest,Present\nAnn,Vase\n").unwrap_err();
        match err {
            GuestCsvError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_only_is_rejected() {
        let err = parse_guest_csv(b"Name,Gift\n").unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_blank_rows_skipped_and_empty_names_reported() {
        let csv = "Name,Gift\nAnn,Vase\n,,\n , Toaster\n";
        let err = parse_guest_csv(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 4"), "{}", message);
        assert!(!message.contains("line 3"), "{}", message);
    }

    #[test]
    fn test_cards_get_default_message() {
        let cards = parse_guest_cards(b"Name,Gift\nAunt Susan,Cash gift\n").unwrap();
        assert_eq!(cards[0].recipient_name, "Aunt Susan");
        assert!(cards[0].message.contains("gift of Cash gift"));
    }
}
