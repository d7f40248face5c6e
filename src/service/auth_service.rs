use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::app_conf::Environment;
use crate::dto::auth_dto::{LoginResponse, RegisterResponse, VerifyResponse};
use crate::dto::user_dto::UserResponse;
use crate::model::user::{User, UserRole};
use crate::model::verification::VerificationRecord;
use crate::repository::user_repo::{UserRepository, UserUpdate};
use crate::repository::verification_repo::VerificationRepository;
use crate::util::email::EmailService;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::recaptcha::CaptchaVerifier;

/// Payload for a registration, after shape validation in the handler.
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub captcha_token: Option<String>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, registration: Registration) -> Result<RegisterResponse, ServiceError>;
    async fn verify(&self, code: String) -> Result<VerifyResponse, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<LoginResponse, ServiceError>;
}

pub struct AuthServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub verification_repo: Arc<dyn VerificationRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    /// Absent in development; registration skips the captcha gate then
    pub captcha: Option<Arc<dyn CaptchaVerifier>>,
    /// Absent in development; accounts are auto-activated then
    pub mailer: Option<Arc<dyn EmailService>>,
    pub environment: Environment,
    pub public_url: String,
}

impl AuthServiceImpl {
    const GENERIC_LOGIN_ERROR: &'static str = "Invalid email or password";

    async fn check_captcha(&self, token: Option<&str>) -> Result<(), ServiceError> {
        if self.environment.is_development() {
            return Ok(());
        }
        let verifier = self.captcha.as_ref().ok_or_else(|| {
            error!("Captcha verifier not configured outside development");
            ServiceError::InternalError("Captcha verifier not configured".to_string())
        })?;
        let token = token.ok_or_else(|| {
            ServiceError::InvalidInput("Captcha token is required".to_string())
        })?;
        verifier
            .verify(token)
            .await
            .map_err(|e| ServiceError::InvalidInput(format!("Captcha verification failed: {}", e)))
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: Registration) -> Result<RegisterResponse, ServiceError> {
        info!("Registering new user");

        self.check_captcha(registration.captcha_token.as_deref())
            .await?;

        if self
            .user_repo
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            warn!("Registration rejected, email already in use");
            return Err(ServiceError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let hash = PasswordUtilsImpl::hash_password(&registration.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;

        let dev_mode = self.environment.is_development();
        let (is_superuser, is_staff) = UserRole::Patient.flags();
        let user = User {
            id: None,
            email: registration.email.clone(),
            password_hash: hash,
            full_name: registration.full_name.clone(),
            // Development auto-activates; production waits for the email link
            is_active: dev_mode,
            is_superuser,
            is_staff,
            roles: Vec::new(),
            extra_permissions: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        let user = self.user_repo.insert(user).await?;
        let user_id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("Inserted user has no id".to_string()))?;

        let auth_code = Uuid::new_v4().to_string();
        let record = self
            .verification_repo
            .insert(VerificationRecord::new_verify(user_id, auth_code.clone()))
            .await?;

        let message = if dev_mode {
            let record_id = record.id.ok_or_else(|| {
                ServiceError::InternalError("Inserted verification record has no id".to_string())
            })?;
            self.verification_repo.mark_verified(record_id).await?;
            info!("Development mode: user auto-activated and verified");
            "Account created and activated".to_string()
        } else {
            let mailer = self.mailer.as_ref().ok_or_else(|| {
                error!("Mailer not configured outside development");
                ServiceError::InternalError("Mailer not configured".to_string())
            })?;
            let verify_url = format!("{}/auth/verify?code={}", self.public_url, auth_code);
            mailer
                .send_verification_email(&user.email, &user.full_name, &verify_url)
                .await
                .map_err(|e| {
                    error!("Failed to send verification email: {}", e);
                    ServiceError::InternalError(format!("Failed to send verification email: {}", e))
                })?;
            info!("Verification email sent");
            "Account created, check your email to activate it".to_string()
        };

        Ok(RegisterResponse {
            user: UserResponse::from(user),
            message,
        })
    }

    #[instrument(skip(self, code))]
    async fn verify(&self, code: String) -> Result<VerifyResponse, ServiceError> {
        info!("Verifying email code");

        let record = self
            .verification_repo
            .find_active_by_code(&code)
            .await?
            .ok_or_else(|| {
                warn!("Verification code not found or already used");
                ServiceError::NotFound("Invalid or already used verification code".to_string())
            })?;
        let record_id = record
            .id
            .ok_or_else(|| ServiceError::InternalError("Verification record has no id".to_string()))?;

        let update = UserUpdate {
            is_active: Some(true),
            ..UserUpdate::default()
        };
        self.user_repo.apply_update(record.user_id, update).await?;
        self.verification_repo.mark_verified(record_id).await?;

        info!("User activated");
        Ok(VerifyResponse {
            message: "Email verified, account activated".to_string(),
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<LoginResponse, ServiceError> {
        info!("User login attempt");

        // Unknown email and wrong password produce the same response, so
        // the endpoint cannot be used to enumerate accounts.
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(Self::GENERIC_LOGIN_ERROR.to_string()))?;

        let valid = PasswordUtilsImpl::verify_password(&password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Login rejected");
            return Err(ServiceError::Unauthorized(
                Self::GENERIC_LOGIN_ERROR.to_string(),
            ));
        }

        if !user.is_active {
            warn!("Login rejected, account not activated");
            return Err(ServiceError::Unauthorized(
                "Account is not activated".to_string(),
            ));
        }

        let token = self
            .jwt_utils
            .generate_token(&user)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;

        info!("User logged in successfully");
        Ok(LoginResponse {
            user: UserResponse::from(user),
            token,
        })
    }
}
