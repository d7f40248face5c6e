use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;
use validator::Validate;

use crate::dto::admin_dto::{
    CreatePermissionRequest, CreateRoleRequest, CreateUserRequest, UpdateUserRequest,
    UserListQuery,
};
use crate::service::admin_service::AdminService;
use crate::util::error::HandlerError;

// Dashboard stats (admin only)
pub async fn dashboard_stats_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = service.dashboard_stats().await?;
    Ok(Json(stats))
}

// List users with status/role filters and pagination
pub async fn list_users_handler(
    State(service): State<Arc<dyn AdminService>>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_users(query).await?;
    Ok(Json(res))
}

// Create user
pub async fn create_user_handler(
    State(service): State<Arc<dyn AdminService>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.create_user(payload).await?;
    Ok(Json(res))
}

// Patch user fields / status / roles / permissions
pub async fn update_user_handler(
    State(service): State<Arc<dyn AdminService>>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.update_user(&id, payload).await?;
    Ok(Json(res))
}

// Delete user (blocked for superusers)
pub async fn delete_user_handler(
    State(service): State<Arc<dyn AdminService>>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_user(&id).await?;
    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}

// Create permission (idempotent existence check by name)
pub async fn create_permission_handler(
    State(service): State<Arc<dyn AdminService>>,
    Json(payload): Json<CreatePermissionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.create_permission(payload).await?;
    Ok(Json(res))
}

// List permissions
pub async fn list_permissions_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_permissions().await?;
    Ok(Json(res))
}

// Create role
pub async fn create_role_handler(
    State(service): State<Arc<dyn AdminService>>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.create_role(payload).await?;
    Ok(Json(res))
}

// List roles
pub async fn list_roles_handler(
    State(service): State<Arc<dyn AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_roles().await?;
    Ok(Json(res))
}
