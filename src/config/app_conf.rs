use std::env;
use tracing::warn;

/// Deployment environment the service runs in.
///
/// Development relaxes the registration flow: captcha verification is
/// skipped and new accounts are activated without a verification email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Base URL used to build links in outgoing emails
    pub public_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let environment = env::var("APP_ENV")
            .map(|s| Environment::from_str(&s))
            .unwrap_or_else(|_| {
                warn!("APP_ENV not set, defaulting to development");
                Environment::Development
            });
        let public_url = env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));
        AppConfig { host, port, environment, public_url }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: Environment::Development,
            public_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str("production"), Environment::Production);
        assert_eq!(Environment::from_str("PROD"), Environment::Production);
        assert_eq!(Environment::from_str("development"), Environment::Development);
        assert_eq!(Environment::from_str("anything"), Environment::Development);
    }

    #[test]
    fn test_default_is_development() {
        let config = AppConfig::default();
        assert!(config.environment.is_development());
        assert_eq!(config.port, 8080);
    }
}
