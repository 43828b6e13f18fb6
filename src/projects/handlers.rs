use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

use super::models::{
    CardsQuery, CardsResponse, CountResponse, CreateProjectRequest, Project,
    RegenerateMessagesRequest, RegenerateMessagesResponse, SuccessResponse, UpdateCardRequest,
    UploadGuestsRequest, UploadResponse, PREVIEW_CARD_LIMIT,
};
use super::upload::read_guest_upload;
use crate::auth::authenticated_user;
use crate::document::Template;
use crate::guests::prewritten_message;
use crate::layout::CardsPerPage;
use crate::messages::MessageRequest;
use crate::{AppState, ErrorResponse};

macro_rules! require_user {
    ($req:expr) => {
        match authenticated_user(&$req) {
            Ok(id) => id,
            Err(e) => return e.error_response(),
        }
    };
}

/// Load a project owned by `user_id`, or the response to send instead.
pub(crate) async fn load_owned_project(
    state: &AppState,
    project_id: &Uuid,
    user_id: &Uuid,
) -> Result<Project, HttpResponse> {
    match state.get_project_for_user(project_id, user_id).await {
        Ok(Some(project)) => Ok(project),
        Ok(None) => Err(HttpResponse::NotFound().json(ErrorResponse::not_found("Project not found"))),
        Err(e) => {
            log::error!("Failed to load project {}: {:?}", project_id, e);
            Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load project")))
        }
    }
}

/// Create a project
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Project created", body = Project),
        (status = 400, description = "Unsupported cards per page"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_project(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateProjectRequest>,
) -> impl Responder {
    let user_id = require_user!(req);

    let density = match body.cards_per_page.map(CardsPerPage::try_from).transpose() {
        Ok(density) => density.unwrap_or_default(),
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()));
        }
    };
    let template = body
        .template
        .as_deref()
        .map(Template::resolve)
        .unwrap_or_default();
    let signer_names = body
        .signer_names
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match state
        .create_project(&user_id, template.id(), u8::from(density) as i16, signer_names)
        .await
    {
        Ok(project) => {
            log::info!("Created project {} for user {}", project.id, user_id);
            HttpResponse::Ok().json(project)
        }
        Err(e) => {
            log::error!("Failed to create project: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to create project"))
        }
    }
}

/// List the caller's projects, newest first
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Projects", body = Vec<Project>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_projects(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let user_id = require_user!(req);

    match state.get_projects_for_user(&user_id).await {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => {
            log::error!("Failed to list projects: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to list projects"))
        }
    }
}

/// Upload a CSV guest list into a project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/upload",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body(content = inline(UploadGuestsRequest), content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cards imported", body = UploadResponse),
        (status = 400, description = "Invalid CSV"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn upload_guests(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> impl Responder {
    let user_id = require_user!(req);
    let project_id = path.into_inner();

    if let Err(response) = load_owned_project(&state, &project_id, &user_id).await {
        return response;
    }

    let cards = match read_guest_upload(payload).await {
        Ok(cards) => cards,
        Err(e) => {
            log::warn!("Rejected guest list for project {}: {}", project_id, e);
            return HttpResponse::from(e);
        }
    };

    match state.insert_cards(&project_id, &cards).await {
        Ok(count) => HttpResponse::Ok().json(UploadResponse { count }),
        Err(e) => {
            log::error!("Failed to store cards for project {}: {:?}", project_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to store cards"))
        }
    }
}

/// Cards of a project; unpaid previews are capped
#[utoipa::path(
    get,
    path = "/api/projects/{id}/cards",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("preview" = Option<bool>, Query, description = "Limit unpaid projects to a preview")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cards", body = CardsResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_cards(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CardsQuery>,
) -> impl Responder {
    let user_id = require_user!(req);
    let project_id = path.into_inner();

    let project = match load_owned_project(&state, &project_id, &user_id).await {
        Ok(project) => project,
        Err(response) => return response,
    };

    let is_paid = project.is_paid();
    let is_preview = query.preview.unwrap_or(false) && !is_paid;
    let limit = is_preview.then_some(PREVIEW_CARD_LIMIT);

    match state.get_cards(&project_id, limit).await {
        Ok(cards) => HttpResponse::Ok().json(CardsResponse {
            total: cards.len(),
            cards,
            is_preview,
            is_paid,
        }),
        Err(e) => {
            log::error!("Failed to load cards for project {}: {:?}", project_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load cards"))
        }
    }
}

/// Total number of cards in a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/cards/count",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card count", body = CountResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn count_cards(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> impl Responder {
    let user_id = require_user!(req);
    let project_id = path.into_inner();

    if let Err(response) = load_owned_project(&state, &project_id, &user_id).await {
        return response;
    }

    match state.count_cards(&project_id).await {
        Ok(total) => HttpResponse::Ok().json(CountResponse { total }),
        Err(e) => {
            log::error!("Failed to count cards: {:?}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to count cards"))
        }
    }
}

/// Edit one card's message
#[utoipa::path(
    put,
    path = "/api/cards/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = UpdateCardRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Card updated", body = SuccessResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Card not found")
    )
)]
pub async fn update_card(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCardRequest>,
) -> impl Responder {
    let user_id = require_user!(req);
    let card_id = path.into_inner();

    let message = body.message.trim();
    if message.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Message cannot be empty"));
    }

    match state.update_card_message(&card_id, &user_id, message).await {
        Ok(true) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Card not found")),
        Err(e) => {
            log::error!("Failed to update card {}: {:?}", card_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to update card"))
        }
    }
}

/// Rewrite all messages of a project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/messages",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = RegenerateMessagesRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Messages rewritten", body = RegenerateMessagesResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn regenerate_messages(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<RegenerateMessagesRequest>,
) -> impl Responder {
    let user_id = require_user!(req);
    let project_id = path.into_inner();

    if let Err(response) = load_owned_project(&state, &project_id, &user_id).await {
        return response;
    }

    let cards = match state.get_cards(&project_id, None).await {
        Ok(cards) => cards,
        Err(e) => {
            log::error!("Failed to load cards for project {}: {:?}", project_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load cards"));
        }
    };

    let mut updates = Vec::with_capacity(cards.len());
    for card in &cards {
        let message = match body.tone {
            Some(tone) => {
                let request = MessageRequest {
                    recipient_name: card.recipient_name.clone(),
                    gift: card.gift.clone(),
                    tone,
                };
                state.messages.generate(&request).await.text
            }
            None => prewritten_message(card.gift.as_deref()).to_string(),
        };
        updates.push((card.id, message));
    }

    match state.update_card_messages(&updates).await {
        Ok(()) => HttpResponse::Ok().json(RegenerateMessagesResponse {
            updated: updates.len(),
        }),
        Err(e) => {
            log::error!("Failed to save messages for project {}: {:?}", project_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to save messages"))
        }
    }
}

/// Configure project routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(list_projects))
            .route(web::post().to(create_project)),
    )
    .route("/projects/{id}/upload", web::post().to(upload_guests))
    .route("/projects/{id}/cards", web::get().to(get_cards))
    .route("/projects/{id}/cards/count", web::get().to(count_cards))
    .route("/projects/{id}/messages", web::post().to(regenerate_messages))
    .route("/cards/{id}", web::put().to(update_card));
}
