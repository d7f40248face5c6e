#![allow(dead_code)]

//! In-memory repository fakes and router builders shared by the
//! integration tests. No MongoDB instance is required.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bson::oid::ObjectId;

use medidiagnose_backend::config::app_conf::Environment;
use medidiagnose_backend::config::JwtConfig;
use medidiagnose_backend::middlewares::auth_middleware::AuthState;
use medidiagnose_backend::model::appointment::{Appointment, AppointmentStatus};
use medidiagnose_backend::model::medical_record::MedicalRecord;
use medidiagnose_backend::model::permission::Permission;
use medidiagnose_backend::model::role::Role;
use medidiagnose_backend::model::user::{User, UserRole};
use medidiagnose_backend::repository::appointment_repo::AppointmentRepository;
use medidiagnose_backend::repository::medical_record_repo::MedicalRecordRepository;
use medidiagnose_backend::repository::permission_repo::PermissionRepository;
use medidiagnose_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use medidiagnose_backend::repository::role_repo::RoleRepository;
use medidiagnose_backend::repository::user_repo::{UserFilter, UserRepository, UserUpdate};
use medidiagnose_backend::repository::verification_repo::VerificationRepository;
use medidiagnose_backend::model::verification::VerificationRecord;
use medidiagnose_backend::service::admin_service::{AdminService, AdminServiceImpl};
use medidiagnose_backend::service::appointment_service::{
    AppointmentService, AppointmentServiceImpl,
};
use medidiagnose_backend::service::auth_service::{AuthService, AuthServiceImpl};
use medidiagnose_backend::service::clinical_service::{ClinicalService, ClinicalServiceImpl};
use medidiagnose_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use medidiagnose_backend::util::password::{PasswordUtils, PasswordUtilsImpl};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeUserRepo {
    pub users: Mutex<Vec<User>>,
}

fn matches(user: &User, filter: &UserFilter) -> bool {
    filter.is_active.map_or(true, |v| user.is_active == v)
        && filter.is_superuser.map_or(true, |v| user.is_superuser == v)
        && filter.is_staff.map_or(true, |v| user.is_staff == v)
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("Duplicate email"));
        }
        if user.id.is_none() {
            user.id = Some(ObjectId::new());
        }
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.id.map(|id| ids.contains(&id)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &UserFilter, page: u32, limit: u32) -> RepositoryResult<Vec<User>> {
        let page = page.max(1);
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| matches(u, filter))
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &UserFilter) -> RepositoryResult<u64> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| matches(u, filter))
            .count() as u64)
    }

    async fn apply_update(&self, id: ObjectId, update: UserUpdate) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No such user"))?;
        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(active) = update.is_active {
            user.is_active = active;
        }
        if let Some(superuser) = update.is_superuser {
            user.is_superuser = superuser;
        }
        if let Some(staff) = update.is_staff {
            user.is_staff = staff;
        }
        if let Some(roles) = update.roles {
            user.roles = roles;
        }
        if let Some(perms) = update.extra_permissions {
            user.extra_permissions = perms;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(user.clone())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != Some(id));
        if users.len() == before {
            return Err(RepositoryError::not_found("No such user"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeVerificationRepo {
    pub records: Mutex<Vec<VerificationRecord>>,
}

#[async_trait]
impl VerificationRepository for FakeVerificationRepo {
    async fn insert(&self, mut record: VerificationRecord) -> RepositoryResult<VerificationRecord> {
        record.id = Some(ObjectId::new());
        record.created_at = Some(chrono::Utc::now().to_rfc3339());
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_active_by_code(&self, code: &str) -> RepositoryResult<Option<VerificationRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.auth_code == code && r.record_type == "verify" && !r.is_verified)
            .cloned())
    }

    async fn mark_verified(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No such record"))?;
        record.is_verified = true;
        record.verified_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePermissionRepo {
    pub permissions: Mutex<Vec<Permission>>,
}

#[async_trait]
impl PermissionRepository for FakePermissionRepo {
    async fn insert(&self, mut permission: Permission) -> RepositoryResult<Permission> {
        let mut permissions = self.permissions.lock().unwrap();
        if permissions.iter().any(|p| p.name == permission.name) {
            return Err(RepositoryError::already_exists("Duplicate permission name"));
        }
        permission.id = Some(ObjectId::new());
        permission.created_at = Some(chrono::Utc::now().to_rfc3339());
        permissions.push(permission.clone());
        Ok(permission)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Permission>> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Permission>> {
        Ok(self.permissions.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeRoleRepo {
    pub roles: Mutex<Vec<Role>>,
}

#[async_trait]
impl RoleRepository for FakeRoleRepo {
    async fn insert(&self, mut role: Role) -> RepositoryResult<Role> {
        let mut roles = self.roles.lock().unwrap();
        if roles.iter().any(|r| r.name == role.name) {
            return Err(RepositoryError::already_exists("Duplicate role name"));
        }
        role.id = Some(ObjectId::new());
        role.created_at = Some(chrono::Utc::now().to_rfc3339());
        roles.push(role.clone());
        Ok(role)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Role>> {
        Ok(self.roles.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeMedicalRecordRepo {
    pub records: Mutex<Vec<MedicalRecord>>,
}

#[async_trait]
impl MedicalRecordRepository for FakeMedicalRecordRepo {
    async fn count_all(&self) -> RepositoryResult<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn count_matching_diagnosis(&self, keywords: &[&str]) -> RepositoryResult<u64> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.diagnosis.as_deref().is_some_and(|d| {
                    let lowered = d.to_lowercase();
                    keywords.iter().any(|kw| lowered.contains(kw))
                })
            })
            .count() as u64)
    }

    async fn count_created_since(&self, since: &str) -> RepositoryResult<u64> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.created_at.as_deref().is_some_and(|c| c >= since))
            .count() as u64)
    }

    async fn find_recent(&self, limit: i64) -> RepositoryResult<Vec<MedicalRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<MedicalRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id.as_ref() == Some(id))
            .cloned())
    }
}

#[derive(Default)]
pub struct FakeAppointmentRepo {
    pub appointments: Mutex<Vec<Appointment>>,
}

#[async_trait]
impl AppointmentRepository for FakeAppointmentRepo {
    async fn insert(&self, mut appointment: Appointment) -> RepositoryResult<Appointment> {
        appointment.id = Some(ObjectId::new());
        appointment.created_at = Some(chrono::Utc::now().to_rfc3339());
        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(appointment)
    }

    async fn list(
        &self,
        patient_id: Option<ObjectId>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Appointment>> {
        let page = page.max(1);
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| patient_id.map_or(true, |id| a.patient_id == id))
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, patient_id: Option<ObjectId>) -> RepositoryResult<u64> {
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| patient_id.map_or(true, |id| a.patient_id == id))
            .count() as u64)
    }

    async fn update_status(
        &self,
        id: ObjectId,
        status: AppointmentStatus,
    ) -> RepositoryResult<Appointment> {
        let mut appointments = self.appointments.lock().unwrap();
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == Some(id))
            .ok_or_else(|| RepositoryError::not_found("No such appointment"))?;
        appointment.status = status;
        Ok(appointment.clone())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn test_jwt_utils() -> Arc<JwtTokenUtilsImpl> {
    Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()))
}

pub fn test_auth_state() -> Arc<AuthState> {
    Arc::new(AuthState {
        jwt_utils: test_jwt_utils(),
    })
}

/// Builds a user record with flags derived from the role.
pub fn make_user(email: &str, role: UserRole, password: &str) -> User {
    let (is_superuser, is_staff) = role.flags();
    User {
        id: Some(ObjectId::new()),
        email: email.to_string(),
        password_hash: PasswordUtilsImpl::hash_password(password).unwrap(),
        full_name: format!("{} User", role.as_str()),
        is_active: true,
        is_superuser,
        is_staff,
        roles: Vec::new(),
        extra_permissions: Vec::new(),
        created_at: Some(chrono::Utc::now().to_rfc3339()),
        updated_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}

pub fn token_for(user: &User) -> String {
    test_jwt_utils().generate_token(user).unwrap().access_token
}

/// Token that is syntactically valid but expired well past the decoder's
/// leeway window.
pub fn expired_token_for(user: &User) -> String {
    let config = JwtConfig {
        token_expiry_minutes: -10,
        ..JwtConfig::default()
    };
    JwtTokenUtilsImpl::new(config)
        .generate_token(user)
        .unwrap()
        .access_token
}

pub struct AuthTestEnv {
    pub user_repo: Arc<FakeUserRepo>,
    pub verification_repo: Arc<FakeVerificationRepo>,
    pub service: Arc<dyn AuthService>,
}

/// Auth service wired for development mode: no captcha, no mailer,
/// accounts auto-activated.
pub fn auth_env() -> AuthTestEnv {
    let user_repo = Arc::new(FakeUserRepo::default());
    let verification_repo = Arc::new(FakeVerificationRepo::default());
    let service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl {
        user_repo: user_repo.clone(),
        verification_repo: verification_repo.clone(),
        jwt_utils: test_jwt_utils(),
        captcha: None,
        mailer: None,
        environment: Environment::Development,
        public_url: "http://localhost:8080".to_string(),
    });
    AuthTestEnv {
        user_repo,
        verification_repo,
        service,
    }
}

pub struct AdminTestEnv {
    pub user_repo: Arc<FakeUserRepo>,
    pub permission_repo: Arc<FakePermissionRepo>,
    pub role_repo: Arc<FakeRoleRepo>,
    pub medical_record_repo: Arc<FakeMedicalRecordRepo>,
    pub service: Arc<dyn AdminService>,
}

pub fn admin_env() -> AdminTestEnv {
    let user_repo = Arc::new(FakeUserRepo::default());
    let permission_repo = Arc::new(FakePermissionRepo::default());
    let role_repo = Arc::new(FakeRoleRepo::default());
    let medical_record_repo = Arc::new(FakeMedicalRecordRepo::default());
    let service: Arc<dyn AdminService> = Arc::new(AdminServiceImpl {
        user_repo: user_repo.clone(),
        permission_repo: permission_repo.clone(),
        role_repo: role_repo.clone(),
        medical_record_repo: medical_record_repo.clone(),
    });
    AdminTestEnv {
        user_repo,
        permission_repo,
        role_repo,
        medical_record_repo,
        service,
    }
}

pub struct ClinicalTestEnv {
    pub user_repo: Arc<FakeUserRepo>,
    pub medical_record_repo: Arc<FakeMedicalRecordRepo>,
    pub service: Arc<dyn ClinicalService>,
}

pub fn clinical_env() -> ClinicalTestEnv {
    let user_repo = Arc::new(FakeUserRepo::default());
    let medical_record_repo = Arc::new(FakeMedicalRecordRepo::default());
    let service: Arc<dyn ClinicalService> = Arc::new(ClinicalServiceImpl {
        user_repo: user_repo.clone(),
        medical_record_repo: medical_record_repo.clone(),
    });
    ClinicalTestEnv {
        user_repo,
        medical_record_repo,
        service,
    }
}

pub struct AppointmentTestEnv {
    pub appointment_repo: Arc<FakeAppointmentRepo>,
    pub service: Arc<dyn AppointmentService>,
}

pub fn appointment_env() -> AppointmentTestEnv {
    let appointment_repo = Arc::new(FakeAppointmentRepo::default());
    let service: Arc<dyn AppointmentService> = Arc::new(AppointmentServiceImpl {
        appointment_repo: appointment_repo.clone(),
    });
    AppointmentTestEnv {
        appointment_repo,
        service,
    }
}
