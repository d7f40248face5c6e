use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Closed set of portal roles. Access flags are derived from the role
/// once, at user creation and token issuance, never re-mapped ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Administrator,
    Doctor,
    Staff,
    Patient,
}

impl UserRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Administrator" => Some(UserRole::Administrator),
            "Doctor" => Some(UserRole::Doctor),
            "Staff" => Some(UserRole::Staff),
            "Patient" => Some(UserRole::Patient),
            _ => None,
        }
    }

    /// (is_superuser, is_staff) access flags for this role
    pub fn flags(&self) -> (bool, bool) {
        match self {
            UserRole::Administrator => (true, true),
            UserRole::Doctor | UserRole::Staff => (false, true),
            UserRole::Patient => (false, false),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Administrator => "Administrator",
            UserRole::Doctor => "Doctor",
            UserRole::Staff => "Staff",
            UserRole::Patient => "Patient",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_staff: bool,
    #[serde(default)]
    pub roles: Vec<ObjectId>,
    #[serde(default)]
    pub extra_permissions: Vec<ObjectId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
