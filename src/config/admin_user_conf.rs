use serde::{Deserialize, Serialize};
use std::env;

use crate::config::ConfigError;

/// Bootstrap credentials for the first superuser, created at startup
/// when no account with this email exists yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AdminUserConfig {
            full_name: env::var("ADMIN_NAME")
                .unwrap_or_else(|_| "Administrator".to_string()),
            email: env::var("ADMIN_EMAIL")
                .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_EMAIL".to_string()))?,
            password: env::var("ADMIN_PASSWORD")
                .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?,
        })
    }
}
