use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::models::{
    ClientSecretResponse, ConfirmPaymentRequest, ConfirmSimpleRequest, CreatePaymentRequest,
    GenerateMessagesRequest, GenerateMessagesResponse, GeneratedMessageItem, GuestCheckoutRequest,
    PdfResponse, PreviewRequest, PreviewResponse,
};
use super::{
    check_cards, check_project_intent, payment_error_response, pdf_error_response, pdf_url,
    store_pdf, with_default_messages,
};
use crate::auth::authenticated_user;
use crate::document::{compose_preview, Card, Template};
use crate::guests::prewritten_message;
use crate::layout::{compute_layout, CardsPerPage};
use crate::messages::chain::MessageSource;
use crate::messages::MessageRequest;
use crate::projects::handlers::load_owned_project;
use crate::projects::models::Project;
use crate::render::PdfRequest;
use crate::store::TempProject;
use crate::{AppState, ErrorResponse};

macro_rules! require_user {
    ($req:expr) => {
        match authenticated_user(&$req) {
            Ok(id) => id,
            Err(e) => return e.error_response(),
        }
    };
}

fn parse_density(value: Option<u8>) -> Result<CardsPerPage, HttpResponse> {
    value
        .map(CardsPerPage::try_from)
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(|e| HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())))
}

/// Render, store and record the PDF for a paid project.
async fn generate_project_pdf(state: &AppState, project: &Project) -> Result<PdfResponse, HttpResponse> {
    let records = state.get_cards(&project.id, None).await.map_err(|e| {
        log::error!("Failed to load cards for project {}: {:?}", project.id, e);
        HttpResponse::InternalServerError().json(ErrorResponse::internal_error("Failed to load cards"))
    })?;
    let cards: Vec<Card> = records.into_iter().map(Card::from).collect();
    let signature = state.config.signature_for(project.signer_names.as_deref());
    let name = format!("project-{}", project.id);

    let generated = state
        .pdf
        .generate(PdfRequest {
            cards: &cards,
            template_id: &project.template,
            cards_per_page: u8::from(project.density()),
            signature: &signature,
            name: &name,
        })
        .await
        .map_err(|e| pdf_error_response(&e))?;

    let path = store_pdf(&state.config.pdf_dir, &generated).await.map_err(|e| {
        log::error!("Failed to write PDF for project {}: {:?}", project.id, e);
        HttpResponse::InternalServerError().json(ErrorResponse::internal_error("Failed to store PDF"))
    })?;

    if let Err(e) = state
        .set_project_pdf(&project.id, &path.to_string_lossy())
        .await
    {
        log::error!("Failed to record PDF path for project {}: {:?}", project.id, e);
    }

    Ok(PdfResponse {
        success: true,
        pdf_url: pdf_url(&generated.filename),
        page_count: generated.page_count,
        card_count: generated.card_count,
    })
}

/// Create a payment intent for a project
#[utoipa::path(
    post,
    path = "/api/create-payment",
    tag = "Checkout",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment intent created", body = ClientSecretResponse),
        (status = 404, description = "Project not found"),
        (status = 502, description = "Payment provider error")
    )
)]
pub async fn create_payment(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreatePaymentRequest>,
) -> impl Responder {
    let user_id = require_user!(req);

    if let Err(response) = load_owned_project(&state, &body.project_id, &user_id).await {
        return response;
    }

    let mut metadata = HashMap::new();
    metadata.insert("projectId".to_string(), body.project_id.to_string());
    metadata.insert("userId".to_string(), user_id.to_string());
    metadata.insert("plan".to_string(), body.plan.to_string());

    match state
        .payments
        .create_intent(body.plan.amount_cents(), &metadata)
        .await
    {
        Ok(intent) => HttpResponse::Ok().json(ClientSecretResponse {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            amount: body.plan.amount_cents(),
        }),
        Err(e) => payment_error_response(&e),
    }
}

/// Verify a payment, mark the project paid and generate its PDF
#[utoipa::path(
    post,
    path = "/api/confirm-payment",
    tag = "Checkout",
    request_body = ConfirmPaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "PDF generated", body = PdfResponse),
        (status = 400, description = "Payment does not belong to this project"),
        (status = 402, description = "Payment not successful"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "PDF generation failed")
    )
)]
pub async fn confirm_payment(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ConfirmPaymentRequest>,
) -> impl Responder {
    let user_id = require_user!(req);

    let intent = match state.payments.verify_succeeded(&body.payment_intent_id).await {
        Ok(intent) => intent,
        Err(e) => return payment_error_response(&e),
    };
    if let Err(reason) = check_project_intent(&intent, &body.project_id, &user_id) {
        log::warn!("Rejected payment for project {}: {}", body.project_id, reason);
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(
            "Payment does not belong to this project",
        ));
    }

    let project = match load_owned_project(&state, &body.project_id, &user_id).await {
        Ok(project) => project,
        Err(response) => return response,
    };

    match state.payment_used_elsewhere(&intent.id, &project.id).await {
        Ok(false) => {}
        Ok(true) => {
            log::warn!("Payment {} already used by another project", intent.id);
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("Payment has already been used"));
        }
        Err(e) => {
            log::error!("Failed to check payment {}: {:?}", intent.id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to record payment"));
        }
    }

    if let Err(e) = state.mark_project_paid(&project.id, &intent.id).await {
        log::error!("Failed to mark project {} paid: {:?}", project.id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error("Failed to record payment"));
    }
    log::info!("Project {} paid with {}", project.id, intent.id);

    match generate_project_pdf(&state, &project).await {
        Ok(pdf) => HttpResponse::Ok().json(pdf),
        Err(response) => response,
    }
}

/// Download the PDF of a paid project
#[utoipa::path(
    get,
    path = "/api/download/{project_id}",
    tag = "Checkout",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "PDF file", content_type = "application/pdf"),
        (status = 403, description = "Payment required"),
        (status = 404, description = "Project or PDF not found")
    )
)]
pub async fn download_pdf(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let user_id = require_user!(req);
    let project_id = path.into_inner();

    let project = match load_owned_project(&state, &project_id, &user_id).await {
        Ok(project) => project,
        Err(response) => return response,
    };

    if !project.is_paid() {
        return HttpResponse::Forbidden().json(ErrorResponse::new("Forbidden", "Payment required"));
    }

    let pdf_path = match project.pdf_path.as_deref().map(PathBuf::from) {
        Some(path) if path.exists() => path,
        _ => {
            log::info!("PDF for project {} missing, regenerating", project.id);
            if let Err(response) = generate_project_pdf(&state, &project).await {
                return response;
            }
            match state.get_project_for_user(&project_id, &user_id).await {
                Ok(Some(Project {
                    pdf_path: Some(path),
                    ..
                })) => PathBuf::from(path),
                _ => {
                    return HttpResponse::NotFound()
                        .json(ErrorResponse::not_found("PDF not found"));
                }
            }
        }
    };

    let filename = pdf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("project-{}.pdf", project.id));

    match NamedFile::open_async(&pdf_path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .into_response(&req),
        Err(e) => {
            log::error!("Failed to open {}: {:?}", pdf_path.display(), e);
            HttpResponse::NotFound().json(ErrorResponse::not_found("PDF not found"))
        }
    }
}

/// Guest checkout: park the cards and create a payment intent
#[utoipa::path(
    post,
    path = "/api/create-payment-intent",
    tag = "Guest Checkout",
    request_body = GuestCheckoutRequest,
    responses(
        (status = 200, description = "Payment intent created", body = ClientSecretResponse),
        (status = 400, description = "Invalid guest list or layout"),
        (status = 502, description = "Payment provider error")
    )
)]
pub async fn create_payment_intent(
    state: web::Data<AppState>,
    body: web::Json<GuestCheckoutRequest>,
) -> impl Responder {
    let body = body.into_inner();

    if let Err(message) = check_cards(&body.guests) {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    }
    let density = match parse_density(body.cards_per_page) {
        Ok(density) => density,
        Err(response) => return response,
    };
    let template = body
        .template
        .as_deref()
        .map(Template::resolve)
        .unwrap_or_default();
    let email = body
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let mut metadata = HashMap::new();
    metadata.insert("plan".to_string(), body.plan.to_string());
    metadata.insert("template".to_string(), template.id().to_string());
    metadata.insert("guestCount".to_string(), body.guests.len().to_string());
    if let Some(email) = &email {
        metadata.insert("email".to_string(), email.clone());
    }

    let intent = match state
        .payments
        .create_intent(body.plan.amount_cents(), &metadata)
        .await
    {
        Ok(intent) => intent,
        Err(e) => return payment_error_response(&e),
    };

    let project = TempProject {
        email,
        plan: body.plan,
        template: template.id().to_string(),
        cards_per_page: density,
        signer_names: body.signer_names,
        cards: with_default_messages(body.guests),
        created_at: Utc::now(),
    };
    state.temp_projects.put(intent.id.clone(), project).await;

    HttpResponse::Ok().json(ClientSecretResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
        amount: body.plan.amount_cents(),
    })
}

/// Guest checkout: verify payment and produce the PDF
#[utoipa::path(
    post,
    path = "/api/confirm-payment-simple",
    tag = "Guest Checkout",
    request_body = ConfirmSimpleRequest,
    responses(
        (status = 200, description = "PDF generated", body = PdfResponse),
        (status = 402, description = "Payment not successful"),
        (status = 404, description = "Checkout not found or expired"),
        (status = 500, description = "PDF generation failed")
    )
)]
pub async fn confirm_payment_simple(
    state: web::Data<AppState>,
    body: web::Json<ConfirmSimpleRequest>,
) -> impl Responder {
    let intent_id = body.payment_intent_id.trim().to_string();

    let project = match state.temp_projects.take(&intent_id).await {
        Some(project) => project,
        None => {
            return HttpResponse::NotFound()
                .json(ErrorResponse::not_found("Checkout not found or expired"));
        }
    };

    if let Err(e) = state.payments.verify_succeeded(&intent_id).await {
        // Keep the checkout so the customer can confirm again.
        state.temp_projects.put(intent_id, project).await;
        return payment_error_response(&e);
    }

    let signature = state.config.signature_for(project.signer_names.as_deref());
    let name = format!("guest-{}", intent_id);
    let result = state
        .pdf
        .generate(PdfRequest {
            cards: &project.cards,
            template_id: &project.template,
            cards_per_page: u8::from(project.cards_per_page),
            signature: &signature,
            name: &name,
        })
        .await;

    let generated = match result {
        Ok(generated) => generated,
        Err(e) => {
            let response = pdf_error_response(&e);
            if !e.is_caller_error() {
                state.temp_projects.put(intent_id, project).await;
            }
            return response;
        }
    };

    if let Err(e) = store_pdf(&state.config.pdf_dir, &generated).await {
        log::error!("Failed to write guest PDF {}: {:?}", generated.filename, e);
        state.temp_projects.put(intent_id, project).await;
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error("Failed to store PDF"));
    }

    log::info!(
        "Guest checkout {} completed ({} cards, plan {})",
        intent_id,
        generated.card_count,
        project.plan
    );
    HttpResponse::Ok().json(PdfResponse {
        success: true,
        pdf_url: pdf_url(&generated.filename),
        page_count: generated.page_count,
        card_count: generated.card_count,
    })
}

/// Compose the first sheet as HTML
#[utoipa::path(
    post,
    path = "/api/preview",
    tag = "Guest Checkout",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Preview sheet", body = PreviewResponse),
        (status = 400, description = "Invalid cards or layout")
    )
)]
pub async fn preview(state: web::Data<AppState>, body: web::Json<PreviewRequest>) -> impl Responder {
    let body = body.into_inner();

    if let Err(message) = check_cards(&body.cards) {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    }
    let density = match parse_density(body.cards_per_page) {
        Ok(density) => density,
        Err(response) => return response,
    };
    let layout = match compute_layout(u8::from(density)) {
        Ok(layout) => layout,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())),
    };

    let cards = with_default_messages(body.cards);
    let signature = state.config.signature_for(body.signer_names.as_deref());
    let template_id = body.template.as_deref().unwrap_or(Template::Classic.id());

    match compose_preview(&cards, template_id, &layout, &signature) {
        Ok(document) => HttpResponse::Ok().json(PreviewResponse {
            template: document.template.id().to_string(),
            cards_per_page: u8::from(density),
            preview_cards: document.card_count(),
            total_cards: cards.len(),
            html: document.to_html(),
        }),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string())),
    }
}

/// Generate messages for a list of guests
#[utoipa::path(
    post,
    path = "/api/messages/generate",
    tag = "Guest Checkout",
    request_body = GenerateMessagesRequest,
    responses(
        (status = 200, description = "Generated messages", body = GenerateMessagesResponse),
        (status = 400, description = "No guests")
    )
)]
pub async fn generate_messages(
    state: web::Data<AppState>,
    body: web::Json<GenerateMessagesRequest>,
) -> impl Responder {
    let body = body.into_inner();
    if body.guests.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("At least one guest is required"));
    }
    if body.guests.iter().any(|g| g.name.trim().is_empty()) {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Every guest needs a name"));
    }

    let mut messages = Vec::with_capacity(body.guests.len());
    for guest in body.guests {
        let gift = guest
            .gift
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        let (message, source) = match body.tone {
            Some(tone) => {
                let request = MessageRequest {
                    recipient_name: guest.name.trim().to_string(),
                    gift: gift.clone(),
                    tone,
                };
                let generated = state.messages.generate(&request).await;
                let source = match generated.source {
                    MessageSource::Provider(name) => name,
                    MessageSource::Local => "local".to_string(),
                };
                (generated.text, source)
            }
            None => (
                prewritten_message(gift.as_deref()).to_string(),
                "prewritten".to_string(),
            ),
        };
        messages.push(GeneratedMessageItem {
            recipient_name: guest.name.trim().to_string(),
            gift,
            message,
            source,
        });
    }

    HttpResponse::Ok().json(GenerateMessagesResponse { messages })
}

/// Configure checkout routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/create-payment", web::post().to(create_payment))
        .route("/confirm-payment", web::post().to(confirm_payment))
        .route("/download/{project_id}", web::get().to(download_pdf))
        .route("/create-payment-intent", web::post().to(create_payment_intent))
        .route("/confirm-payment-simple", web::post().to(confirm_payment_simple))
        .route("/preview", web::post().to(preview))
        .route("/messages/generate", web::post().to(generate_messages));
}
