use bson::oid::ObjectId;
use serde::Serialize;

use crate::model::user::User;

/// User as exposed by the API, without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Option<ObjectId>,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub roles: Vec<String>,
    pub extra_permissions: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
            roles: user.roles.iter().map(|id| id.to_hex()).collect(),
            extra_permissions: user
                .extra_permissions
                .iter()
                .map(|id| id.to_hex())
                .collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
