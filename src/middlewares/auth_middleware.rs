use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::util::error::HandlerError;
use crate::util::jwt::{Claims, JwtError, JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

fn authenticate(state: &AuthState, req: &Request<Body>) -> Result<Claims, HandlerError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Missing authorization header"))?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("Invalid authorization header"))?;

    state.jwt_utils.validate_token(&token).map_err(|e| match e {
        JwtError::TokenExpired => HandlerError::unauthorized("Token has expired"),
        _ => HandlerError::unauthorized("Invalid token"),
    })
}

/// Gate for the `/admin` and `/doctor` scopes: any staff-level account
/// (superuser or staff flag) passes; flags come from the token as issued
/// at login, not from a fresh user lookup.
pub async fn staff_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = authenticate(&state, &req)?;

    if !(claims.is_superuser || claims.is_staff) {
        return Err(HandlerError::forbidden("Staff access required"));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Gate for patient-facing routes: any valid token passes.
pub async fn token_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = authenticate(&state, &req)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
