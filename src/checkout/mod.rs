//! Payment, PDF delivery and the stateless guest-flow endpoints.
//!
//! - `handlers` - authenticated and guest checkout, download, preview
//! - `models` - request/response bodies

pub mod handlers;
pub mod models;

use actix_web::HttpResponse;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::document::Card;
use crate::guests::default_message;
use crate::payment::{PaymentError, PaymentIntent, Plan};
use crate::render::{GeneratedPdf, PdfError};
use crate::ErrorResponse;

/// Public URL prefix of the generated PDF directory.
pub const PDF_URL_PREFIX: &str = "/pdfs";

pub fn pdf_url(filename: &str) -> String {
    format!("{}/{}", PDF_URL_PREFIX, filename)
}

/// Write a generated PDF into `dir`, creating it if needed.
pub async fn store_pdf(dir: &Path, pdf: &GeneratedPdf) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&pdf.filename);
    tokio::fs::write(&path, &pdf.pdf).await?;
    Ok(path)
}

/// Fill blank messages with the stock text for the guest's gift.
pub fn with_default_messages(cards: Vec<Card>) -> Vec<Card> {
    cards
        .into_iter()
        .map(|mut card| {
            if card.message.trim().is_empty() {
                card.message = default_message(card.gift.as_deref());
            }
            card
        })
        .collect()
}

/// First problem with a caller-supplied card list, if any.
pub fn check_cards(cards: &[Card]) -> Result<(), String> {
    if cards.is_empty() {
        return Err("At least one guest is required".to_string());
    }
    if let Some(position) = cards
        .iter()
        .position(|card| card.recipient_name.trim().is_empty())
    {
        return Err(format!("Guest {} has no name", position + 1));
    }
    Ok(())
}

/// Check that a succeeded intent was created by `create-payment` for this
/// project and user, and that it charged the plan's full price.
pub fn check_project_intent(
    intent: &PaymentIntent,
    project_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), String> {
    let metadata = |key: &str| intent.metadata.get(key).map(String::as_str);

    match metadata("projectId") {
        Some(paid_for) if paid_for == project_id.to_string() => {}
        Some(paid_for) => {
            return Err(format!(
                "payment {} belongs to project {}",
                intent.id, paid_for
            ))
        }
        None => return Err(format!("payment {} is not a project payment", intent.id)),
    }
    if metadata("userId") != Some(user_id.to_string().as_str()) {
        return Err(format!("payment {} belongs to another user", intent.id));
    }

    let plan: Plan = metadata("plan")
        .ok_or_else(|| format!("payment {} has no plan", intent.id))?
        .parse()
        .map_err(|e: PaymentError| e.to_string())?;
    if intent.amount != plan.amount_cents() {
        return Err(format!(
            "payment {} charged {} cents, {} costs {}",
            intent.id,
            intent.amount,
            plan,
            plan.amount_cents()
        ));
    }
    Ok(())
}

pub(crate) fn pdf_error_response(err: &PdfError) -> HttpResponse {
    if err.is_caller_error() {
        log::warn!("Rejected PDF request ({}): {}", err.kind(), err);
        HttpResponse::BadRequest().json(ErrorResponse::new(err.kind(), &err.user_message()))
    } else {
        log::error!("PDF generation failed ({}): {}", err.kind(), err);
        HttpResponse::InternalServerError()
            .json(ErrorResponse::new("PdfGenerationFailed", &err.user_message()))
    }
}

pub(crate) fn payment_error_response(err: &PaymentError) -> HttpResponse {
    match err {
        PaymentError::InvalidPlan(_) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
        }
        PaymentError::NotSucceeded(_) => HttpResponse::PaymentRequired()
            .json(ErrorResponse::new("PaymentRequired", "Payment not successful")),
        PaymentError::NotConfigured => {
            log::error!("Payment attempted without STRIPE_SECRET_KEY");
            HttpResponse::ServiceUnavailable()
                .json(ErrorResponse::new("ServiceUnavailable", "Payments are unavailable"))
        }
        PaymentError::Transport(_) | PaymentError::Rejected { .. } => {
            log::error!("Payment gateway error: {}", err);
            HttpResponse::BadGateway()
                .json(ErrorResponse::new("PaymentGatewayError", "Payment provider error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentStatus;
    use actix_web::http::StatusCode;

    #[test]
    fn test_default_messages_filled() {
        let cards = with_default_messages(vec![
            Card::new("Ann", Some("Vase"), ""),
            Card::new("Bob", None, "Custom"),
        ]);
        assert!(cards[0].message.contains("gift of Vase"));
        assert_eq!(cards[1].message, "Custom");
    }

    #[test]
    fn test_check_cards() {
        assert!(check_cards(&[]).is_err());
        let err = check_cards(&[Card::new("Ann", None, "x"), Card::new(" ", None, "y")])
            .unwrap_err();
        assert_eq!(err, "Guest 2 has no name");
        assert!(check_cards(&[Card::new("Ann", None, "x")]).is_ok());
    }

    #[test]
    fn test_payment_error_statuses() {
        let unpaid = PaymentError::NotSucceeded(PaymentStatus::Processing);
        assert_eq!(payment_error_response(&unpaid).status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            payment_error_response(&PaymentError::NotConfigured).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    fn project_intent(metadata: &[(&str, &str)], amount: i64) -> PaymentIntent {
        PaymentIntent {
            id: "pi_1".to_string(),
            client_secret: None,
            status: PaymentStatus::Succeeded,
            amount,
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_project_intent_checks() {
        let project = Uuid::new_v4();
        let user = Uuid::new_v4();
        let (p, u) = (project.to_string(), user.to_string());

        let valid = project_intent(&[("projectId", &p), ("userId", &u), ("plan", "premium")], 3900);
        assert!(check_project_intent(&valid, &project, &user).is_ok());

        // Guest checkout intents carry no project.
        let guest = project_intent(&[("plan", "premium"), ("guestCount", "3")], 3900);
        let err = check_project_intent(&guest, &project, &user).unwrap_err();
        assert!(err.contains("not a project payment"));

        let other_project = Uuid::new_v4();
        assert!(check_project_intent(&valid, &other_project, &user).is_err());
        assert!(check_project_intent(&valid, &project, &Uuid::new_v4()).is_err());

        let underpaid = project_intent(&[("projectId", &p), ("userId", &u), ("plan", "unlimited")], 1900);
        assert!(check_project_intent(&underpaid, &project, &user)
            .unwrap_err()
            .contains("1900"));

        let no_plan = project_intent(&[("projectId", &p), ("userId", &u)], 3900);
        assert!(check_project_intent(&no_plan, &project, &user).is_err());
    }

    #[test]
    fn test_pdf_url() {
        assert_eq!(pdf_url("a.pdf"), "/pdfs/a.pdf");
    }

    #[tokio::test]
    async fn test_store_pdf_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let generated = GeneratedPdf {
            filename: "cards.pdf".into(),
            pdf: b"%PDF-1.7 test".to_vec(),
            page_count: 1,
            card_count: 1,
        };
        let path = store_pdf(&dir.path().join("nested"), &generated).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.7 test");
    }
}
