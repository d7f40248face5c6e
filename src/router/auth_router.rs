use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handler::auth_handler::{login_handler, register_handler, verify_handler};
use crate::service::auth_service::AuthService;

pub fn auth_router(service: Arc<dyn AuthService>) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/verify", get(verify_handler))
        .route("/auth/login", post(login_handler))
        .with_state(service)
}
