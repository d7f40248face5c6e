use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Email configuration for SMTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username for authentication
    pub smtp_username: String,
    /// SMTP password for authentication
    pub smtp_password: String,
    /// Whether to use TLS encryption
    pub use_tls: bool,
    /// Whether to use STARTTLS
    pub use_starttls: bool,
    /// From email address
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl EmailConfig {
    /// Create EmailConfig from environment variables
    ///
    /// Expected environment variables:
    /// - SMTP_HOST: SMTP server hostname (required)
    /// - SMTP_PORT: SMTP server port (defaults to 587)
    /// - EMAIL_USER: SMTP username (required)
    /// - EMAIL_PASS: SMTP password (required)
    /// - SMTP_USE_TLS / SMTP_USE_STARTTLS: TLS settings (default true)
    /// - EMAIL_FROM: From address (defaults to EMAIL_USER)
    /// - EMAIL_FROM_NAME: Display name (defaults to "MediDiagnose")
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let smtp_host = env::var("SMTP_HOST").map_err(|_| {
            error!("SMTP_HOST environment variable not found");
            ConfigError::EnvVarNotFound("SMTP_HOST".to_string())
        })?;
        debug!("SMTP host: {}", smtp_host);

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| {
                warn!("SMTP_PORT not set, defaulting to 587");
                "587".to_string()
            })
            .parse::<u16>()
            .map_err(|_| {
                error!("Invalid SMTP_PORT value");
                ConfigError::InvalidValue("Invalid SMTP_PORT value".to_string())
            })?;

        let smtp_username = env::var("EMAIL_USER").map_err(|_| {
            error!("EMAIL_USER environment variable not found");
            ConfigError::EnvVarNotFound("EMAIL_USER".to_string())
        })?;

        let smtp_password = env::var("EMAIL_PASS").map_err(|_| {
            error!("EMAIL_PASS environment variable not found");
            ConfigError::EnvVarNotFound("EMAIL_PASS".to_string())
        })?;
        debug!("SMTP password: [REDACTED]");

        let use_tls = env::var("SMTP_USE_TLS")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let use_starttls = env::var("SMTP_USE_STARTTLS")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let from_email = env::var("EMAIL_FROM").unwrap_or_else(|_| smtp_username.clone());
        let from_name =
            env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "MediDiagnose".to_string());

        let connection_timeout_secs = env::var("SMTP_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid SMTP_CONNECTION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid SMTP_CONNECTION_TIMEOUT value".to_string())
            })?;

        let config = EmailConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            use_tls,
            use_starttls,
            from_email,
            from_name,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            error!("SMTP host is empty");
            return Err(ConfigError::ValidationError(
                "SMTP host cannot be empty".to_string(),
            ));
        }
        if self.from_email.is_empty() || !self.from_email.contains('@') {
            error!("Invalid from email address: {}", self.from_email);
            return Err(ConfigError::ValidationError(
                "From email address is invalid".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "noreply@medidiagnose.test".to_string(),
            from_name: "MediDiagnose".to_string(),
            connection_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EmailConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = EmailConfig::default();
        config.smtp_host = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_from_address() {
        let mut config = EmailConfig::default();
        config.from_email = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }
}
