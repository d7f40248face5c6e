use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::model::user::User;

/// JWT token claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID, ObjectId hex)
    pub sub: String,
    /// User email
    pub email: String,
    /// Role ids assigned to the user (ObjectId hex)
    pub roles: Vec<String>,
    /// Extra permission ids granted outside of roles (ObjectId hex)
    pub extra_permissions: Vec<String>,
    /// Superuser flag as persisted at issuance time
    pub is_superuser: bool,
    /// Staff flag as persisted at issuance time
    pub is_staff: bool,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

/// Issued bearer token with its lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
    #[error("Missing JWT secret")]
    MissingSecret,
}

pub trait JwtTokenUtils {
    fn generate_token(&self, user: &User) -> Result<IssuedToken, JwtError>;
    fn validate_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }

    /// Create JWT utils from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let jwt_config = JwtConfig::from_env().map_err(|_| JwtError::MissingSecret)?;
        Ok(JwtTokenUtilsImpl::new(jwt_config))
    }

    /// Build the claims for a user snapshot. Role flags are copied from
    /// the persisted record; they are not re-checked until re-login.
    fn build_claims(&self, user: &User) -> Claims {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.jwt_config.token_expiry_minutes);
        Claims {
            sub: user.id.as_ref().map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email.clone(),
            roles: user.roles.iter().map(|id| id.to_hex()).collect(),
            extra_permissions: user
                .extra_permissions
                .iter()
                .map(|id| id.to_hex())
                .collect(),
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_token(&self, user: &User) -> Result<IssuedToken, JwtError> {
        debug!("Generating token for user: {}", user.email);

        let claims = self.build_claims(user);
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_ref());

        match encode(&header, &claims, &encoding_key) {
            Ok(token) => {
                info!("Successfully generated token for user: {}", claims.sub);
                Ok(IssuedToken {
                    access_token: token,
                    expires_in: self.jwt_config.token_expiry_minutes * 60,
                    token_type: "Bearer".to_string(),
                })
            }
            Err(err) => {
                error!("Failed to encode JWT token: {}", err);
                Err(JwtError::EncodingFailed(err.to_string()))
            }
        }
    }

    fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        debug!("Validating JWT token");

        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("Token validation successful for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    warn!("Rejected expired token");
                    Err(JwtError::TokenExpired)
                }
                _ => {
                    error!("Failed to decode JWT token: {}", err);
                    Err(JwtError::DecodingFailed(err.to_string()))
                }
            },
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        debug!("Extracting token from authorization header");

        if !auth_header.starts_with("Bearer ") {
            error!("Invalid authorization header format");
            return Err(JwtError::InvalidToken);
        }

        let token = auth_header.trim_start_matches("Bearer ").trim();

        if token.is_empty() {
            error!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }

        Ok(token.to_string())
    }
}
