use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::user_dto::UserResponse;
use crate::util::jwt::IssuedToken;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Must equal `password`; checked before any database work
    pub confirm_password: String,
    /// reCAPTCHA response token; ignored in development mode
    pub captcha_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: IssuedToken,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub message: String,
}
