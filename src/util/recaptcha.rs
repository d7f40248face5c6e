use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::RecaptchaConfig;

/// Captcha verification errors
#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    #[error("Captcha verification request failed: {0}")]
    RequestFailed(String),
    #[error("Captcha token rejected")]
    Rejected,
    #[error("Captcha score {0} below threshold")]
    LowScore(f64),
}

/// Captcha gate for the registration endpoint. Development mode bypasses
/// it entirely; tests substitute a fake.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<(), CaptchaError>;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    score: Option<f64>,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// Google reCAPTCHA siteverify client
pub struct RecaptchaVerifier {
    config: RecaptchaConfig,
    client: reqwest::Client,
}

impl RecaptchaVerifier {
    pub fn new(config: RecaptchaConfig) -> Self {
        RecaptchaVerifier {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<(), CaptchaError> {
        debug!("Verifying captcha token");

        let params = [
            ("secret", self.config.secret.as_str()),
            ("response", token),
        ];
        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!("Captcha verification request failed: {}", e);
                CaptchaError::RequestFailed(e.to_string())
            })?;

        let body: SiteVerifyResponse = response.json().await.map_err(|e| {
            error!("Failed to parse captcha verification response: {}", e);
            CaptchaError::RequestFailed(e.to_string())
        })?;

        if !body.success {
            warn!("Captcha token rejected: {:?}", body.error_codes);
            return Err(CaptchaError::Rejected);
        }

        // v3 tokens carry a score; v2 responses do not
        if let Some(score) = body.score {
            if score < self.config.min_score {
                warn!("Captcha score too low: {}", score);
                return Err(CaptchaError::LowScore(score));
            }
        }

        info!("Captcha verification passed");
        Ok(())
    }
}
