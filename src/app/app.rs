use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::{error, info, warn};

use crate::config::app_conf::AppConfig;
use crate::config::{
    AdminUserConfig, EmailConfig, JwtConfig, MongoConfig, RecaptchaConfig,
};
use crate::middlewares::auth_middleware::AuthState;
use crate::model::user::{User, UserRole};
use crate::repository::appointment_repo::{AppointmentRepository, AppointmentRepositoryImpl};
use crate::repository::medical_record_repo::{
    MedicalRecordRepository, MedicalRecordRepositoryImpl,
};
use crate::repository::permission_repo::{PermissionRepository, PermissionRepositoryImpl};
use crate::repository::role_repo::{RoleRepository, RoleRepositoryImpl};
use crate::repository::user_repo::{UserRepository, UserRepositoryImpl};
use crate::repository::verification_repo::{VerificationRepository, VerificationRepositoryImpl};
use crate::repository::MongoStore;
use crate::router::admin_router::admin_router;
use crate::router::appointment_router::appointment_router;
use crate::router::auth_router::auth_router;
use crate::router::clinical_router::clinical_router;
use crate::service::admin_service::{AdminService, AdminServiceImpl};
use crate::service::appointment_service::{AppointmentService, AppointmentServiceImpl};
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::clinical_service::{ClinicalService, ClinicalServiceImpl};
use crate::util::email::{EmailService, SmtpEmailService};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::recaptcha::{CaptchaVerifier, RecaptchaVerifier};

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");

        let store = MongoStore::connect(&mongo_config)
            .await
            .expect("MongoDB connection error");
        store
            .ensure_indexes()
            .await
            .expect("MongoDB index initialization error");

        let user_repo: Arc<dyn UserRepository> =
            Arc::new(UserRepositoryImpl::new(&store.database));
        let verification_repo: Arc<dyn VerificationRepository> =
            Arc::new(VerificationRepositoryImpl::new(&store.database));
        let permission_repo: Arc<dyn PermissionRepository> =
            Arc::new(PermissionRepositoryImpl::new(&store.database));
        let role_repo: Arc<dyn RoleRepository> = Arc::new(RoleRepositoryImpl::new(&store.database));
        let medical_record_repo: Arc<dyn MedicalRecordRepository> =
            Arc::new(MedicalRecordRepositoryImpl::new(&store.database));
        let appointment_repo: Arc<dyn AppointmentRepository> =
            Arc::new(AppointmentRepositoryImpl::new(&store.database));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));

        // Development runs without the captcha and SMTP collaborators;
        // production requires both to be configured.
        let (captcha, mailer): (
            Option<Arc<dyn CaptchaVerifier>>,
            Option<Arc<dyn EmailService>>,
        ) = if config.environment.is_development() {
            warn!("Development mode: captcha and email verification disabled");
            (None, None)
        } else {
            let recaptcha_config = RecaptchaConfig::from_env().expect("reCAPTCHA config error");
            let email_config = EmailConfig::from_env().expect("Email config error");
            let mailer = SmtpEmailService::new(email_config).expect("SMTP service error");
            (
                Some(Arc::new(RecaptchaVerifier::new(recaptcha_config))),
                Some(Arc::new(mailer)),
            )
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl {
            user_repo: user_repo.clone(),
            verification_repo,
            jwt_utils: jwt_utils.clone(),
            captcha,
            mailer,
            environment: config.environment,
            public_url: config.public_url.clone(),
        });
        let admin_service: Arc<dyn AdminService> = Arc::new(AdminServiceImpl {
            user_repo: user_repo.clone(),
            permission_repo,
            role_repo,
            medical_record_repo: medical_record_repo.clone(),
        });
        let clinical_service: Arc<dyn ClinicalService> = Arc::new(ClinicalServiceImpl {
            user_repo: user_repo.clone(),
            medical_record_repo,
        });
        let appointment_service: Arc<dyn AppointmentService> =
            Arc::new(AppointmentServiceImpl { appointment_repo });

        let auth_state = Arc::new(AuthState {
            jwt_utils: jwt_utils.clone(),
        });

        let router = Router::new()
            .merge(auth_router(auth_service))
            .merge(admin_router(admin_service, auth_state.clone()))
            .merge(clinical_router(clinical_service, auth_state.clone()))
            .merge(appointment_router(appointment_service, auth_state))
            .route("/health", get(|| async { "OK" }));

        create_first_admin_user(user_repo.as_ref()).await;

        App { config, router }
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }
}

/// Creates the bootstrap superuser from ADMIN_* env vars when no account
/// with that email exists yet. Skipped silently if the vars are absent.
async fn create_first_admin_user(user_repo: &dyn UserRepository) {
    let admin_conf = match AdminUserConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            warn!("Admin user config not loaded: {e}");
            return;
        }
    };

    match user_repo.find_by_email(&admin_conf.email).await {
        Ok(Some(_)) => {
            info!("Admin user already exists, skipping creation.");
            return;
        }
        Ok(None) => { /* continue to create */ }
        Err(e) => {
            error!("Failed to check for existing admin user: {e}");
            return;
        }
    }

    let hash = match PasswordUtilsImpl::hash_password(&admin_conf.password) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to hash admin password: {e}");
            return;
        }
    };

    let (is_superuser, is_staff) = UserRole::Administrator.flags();
    let user = User {
        id: None,
        email: admin_conf.email,
        password_hash: hash,
        full_name: admin_conf.full_name,
        is_active: true,
        is_superuser,
        is_staff,
        roles: Vec::new(),
        extra_permissions: Vec::new(),
        created_at: None,
        updated_at: None,
    };
    match user_repo.insert(user).await {
        Ok(_) => info!("First admin user created."),
        Err(e) => error!("Failed to create admin user: {e}"),
    }
}
