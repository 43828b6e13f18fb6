use actix_web::{web, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};

use super::jwt::{generate_token, get_token_expiry};
use super::model::{Credentials, TokenResponse, User, UserInfo};
use crate::AppState;

fn token_response(state: &AppState, user: User) -> HttpResponse {
    match generate_token(&state.config.jwt_secret, &user.id.to_string(), &user.email) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: get_token_expiry(),
            user: UserInfo::from(user),
        }),
        Err(e) => {
            log::error!("Failed to generate token: {:?}", e);
            HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Failed to generate token"))
        }
    }
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Authentication",
    request_body = Credentials,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn register(state: web::Data<AppState>, body: web::Json<Credentials>) -> impl Responder {
    if let Err(message) = body.validate() {
        return HttpResponse::BadRequest().json(crate::ErrorResponse::bad_request(message));
    }
    let email = body.normalized_email();

    match state.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest()
                .json(crate::ErrorResponse::bad_request("Email already registered"));
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Database error during registration: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Registration failed"));
        }
    }

    let password = body.password.clone();
    let password_hash = match web::block(move || hash(password, DEFAULT_COST)).await {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => {
            log::error!("Failed to hash password: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Registration failed"));
        }
        Err(e) => {
            log::error!("Password hashing task failed: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Registration failed"));
        }
    };

    match state.create_user(&email, &password_hash).await {
        Ok(user) => {
            log::info!("Registered user {}", user.id);
            token_response(&state, user)
        }
        Err(e) => {
            log::error!("Failed to create user: {:?}", e);
            HttpResponse::BadRequest()
                .json(crate::ErrorResponse::bad_request("Email already registered"))
        }
    }
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Authentication",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(state: web::Data<AppState>, body: web::Json<Credentials>) -> impl Responder {
    let email = body.normalized_email();

    let user = match state.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
                "Unauthorized",
                "Invalid email or password",
            ));
        }
        Err(e) => {
            log::error!("Database error during login: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(crate::ErrorResponse::internal_error("Login failed"));
        }
    };

    let password = body.password.clone();
    let password_hash = user.password_hash.clone();
    let password_valid = web::block(move || verify(password, &password_hash))
        .await
        .map(|r| r.unwrap_or(false))
        .unwrap_or(false);
    if !password_valid {
        return HttpResponse::Unauthorized().json(crate::ErrorResponse::new(
            "Unauthorized",
            "Invalid email or password",
        ));
    }

    token_response(&state, user)
}

/// Configure auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login));
}
