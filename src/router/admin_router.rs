use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::{middleware, Router};

use crate::handler::admin_handler::{
    create_permission_handler, create_role_handler, create_user_handler, dashboard_stats_handler,
    delete_user_handler, list_permissions_handler, list_roles_handler, list_users_handler,
    update_user_handler,
};
use crate::middlewares::auth_middleware::{staff_auth, AuthState};
use crate::service::admin_service::AdminService;

pub fn admin_router(service: Arc<dyn AdminService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/admin/dashboard-stats", get(dashboard_stats_handler))
        .route("/admin/users", get(list_users_handler))
        .route("/admin/users", post(create_user_handler))
        .route("/admin/users/:id", patch(update_user_handler))
        .route("/admin/users/:id", delete(delete_user_handler))
        .route("/admin/permissions", get(list_permissions_handler))
        .route("/admin/permissions", post(create_permission_handler))
        .route("/admin/roles", get(list_roles_handler))
        .route("/admin/roles", post(create_role_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, staff_auth))
        .with_state(service)
}
