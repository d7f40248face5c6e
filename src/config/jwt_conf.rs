use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key used to sign tokens (HS256)
    pub jwt_secret: String,
    /// Token lifetime in minutes
    pub token_expiry_minutes: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required)
    /// - JWT_EXPIRY_MINUTES: Token lifetime in minutes (defaults to 10080 = 7 days)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;

        let token_expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|_| {
                warn!("JWT_EXPIRY_MINUTES not set, using default: 10080 minutes (7 days)");
                "10080".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_EXPIRY_MINUTES value: {}", e);
                ConfigError::InvalidValue(format!("JWT_EXPIRY_MINUTES: {}", e))
            })?;
        debug!("JWT token expiry: {} minutes", token_expiry_minutes);

        let config = JwtConfig { jwt_secret, token_expiry_minutes };
        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }
        if self.token_expiry_minutes <= 0 {
            error!("JWT_EXPIRY_MINUTES must be greater than 0");
            return Err(ConfigError::ValidationError(
                "Token expiry must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security"
                .to_string(),
            token_expiry_minutes: 10080, // 7 days
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = JwtConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token_expiry_minutes, 10080);
    }

    #[test]
    fn test_validate_short_secret() {
        let config = JwtConfig {
            jwt_secret: "short".to_string(),
            ..JwtConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_expiry() {
        let config = JwtConfig {
            token_expiry_minutes: 0,
            ..JwtConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
