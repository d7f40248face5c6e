use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::user_dto::UserResponse;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// "Active" or "Suspended"
    pub status: Option<String>,
    /// Coarse role bucket: Administrator / Doctor / Staff / Patient
    pub role: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// One of the closed role set; decides the access flags
    pub role: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,
    /// "Active" or "Suspended"
    pub status: Option<String>,
    /// Re-derives the access flags when present
    pub role: Option<String>,
    /// Role ObjectIds, hex-encoded
    pub roles: Option<Vec<String>>,
    /// Permission ObjectIds, hex-encoded
    pub extra_permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub description: Option<String>,
    /// Permission ObjectIds, hex-encoded
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub suspended_users: u64,
    pub administrators: u64,
    pub staff: u64,
    pub patients: u64,
    pub total_scans: u64,
    pub abnormal_scans: u64,
}

