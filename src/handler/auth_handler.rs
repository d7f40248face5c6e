use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, RegisterRequest, VerifyQuery};
use crate::service::auth_service::{AuthService, Registration};
use crate::util::error::HandlerError;

// Register
pub async fn register_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    // Confirmation mismatch fails before the service touches the database
    if payload.password != payload.confirm_password {
        return Err(HandlerError::bad_request("Passwords do not match"));
    }
    let registration = Registration {
        full_name: payload.full_name,
        email: payload.email,
        password: payload.password,
        captcha_token: payload.captcha_token,
    };
    let res = service.register(registration).await?;
    Ok(Json(res))
}

// Verify email
pub async fn verify_handler(
    State(service): State<Arc<dyn AuthService>>,
    Query(query): Query<VerifyQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.verify(query.code).await?;
    Ok(Json(res))
}

// Login
pub async fn login_handler(
    State(service): State<Arc<dyn AuthService>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.login(payload.email, payload.password).await?;
    Ok(Json(res))
}
