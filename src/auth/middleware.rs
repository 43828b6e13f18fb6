use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{web, Error, HttpRequest};
use uuid::Uuid;

use super::jwt::validate_token;
use super::model::Claims;
use crate::AppState;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Validate token from HttpRequest and return claims
pub fn validate_request_token(req: &HttpRequest) -> Result<Claims, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ErrorInternalServerError("Application state missing"))?;

    let token =
        extract_token(req).ok_or_else(|| ErrorUnauthorized("Missing authorization token"))?;

    validate_token(&state.config.jwt_secret, &token).map_err(|e| {
        log::warn!("Token validation failed: {:?}", e);
        ErrorUnauthorized("Invalid or expired token")
    })
}

/// Validate the request and return the caller's user id
pub fn authenticated_user(req: &HttpRequest) -> Result<Uuid, Error> {
    let claims = validate_request_token(req)?;
    claims
        .user_id()
        .ok_or_else(|| ErrorUnauthorized("Invalid token subject"))
}
