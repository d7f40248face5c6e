use std::env;
use tracing::{error, info, warn};

use crate::config::ConfigError;

/// reCAPTCHA verification configuration
#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    /// Secret key for the siteverify API
    pub secret: String,
    /// Minimum score accepted for a v3 token
    pub min_score: f64,
    /// siteverify endpoint, overridable for tests
    pub verify_url: String,
}

impl RecaptchaConfig {
    /// Load reCAPTCHA configuration from environment variables
    ///
    /// Expected environment variables:
    /// - RECAPTCHA_SECRET: secret key (required)
    /// - RECAPTCHA_MIN_SCORE: minimum accepted score (defaults to 0.5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading reCAPTCHA configuration from environment variables");

        let secret = env::var("RECAPTCHA_SECRET").map_err(|_| {
            error!("RECAPTCHA_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("RECAPTCHA_SECRET".to_string())
        })?;

        let min_score = env::var("RECAPTCHA_MIN_SCORE")
            .unwrap_or_else(|_| {
                warn!("RECAPTCHA_MIN_SCORE not set, using default: 0.5");
                "0.5".to_string()
            })
            .parse::<f64>()
            .map_err(|_| {
                error!("Invalid RECAPTCHA_MIN_SCORE value");
                ConfigError::InvalidValue("Invalid RECAPTCHA_MIN_SCORE value".to_string())
            })?;

        let config = RecaptchaConfig {
            secret,
            min_score,
            verify_url: "https://www.google.com/recaptcha/api/siteverify".to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            error!("reCAPTCHA secret is empty");
            return Err(ConfigError::ValidationError(
                "reCAPTCHA secret cannot be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            error!("reCAPTCHA min score out of range: {}", self.min_score);
            return Err(ConfigError::ValidationError(
                "reCAPTCHA min score must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RecaptchaConfig {
    fn default() -> Self {
        RecaptchaConfig {
            secret: "test-recaptcha-secret".to_string(),
            min_score: 0.5,
            verify_url: "https://www.google.com/recaptcha/api/siteverify".to_string(),
        }
    }
}
