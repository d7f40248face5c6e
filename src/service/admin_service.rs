use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::dto::admin_dto::{
    AdminDashboardStats, CreatePermissionRequest, CreateRoleRequest, CreateUserRequest,
    UpdateUserRequest, UserListQuery, UserListResponse,
};
use crate::dto::user_dto::UserResponse;
use crate::model::permission::Permission;
use crate::model::role::Role;
use crate::model::user::{User, UserRole};
use crate::repository::medical_record_repo::MedicalRecordRepository;
use crate::repository::permission_repo::PermissionRepository;
use crate::repository::role_repo::RoleRepository;
use crate::repository::user_repo::{UserFilter, UserRepository, UserUpdate};
use crate::service::clinical_service::ABNORMAL_KEYWORDS;
use crate::util::error::ServiceError;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maps a coarse role bucket name onto a flag filter.
fn bucket_filter(role: &str) -> Result<UserFilter, ServiceError> {
    let role = UserRole::parse(role)
        .ok_or_else(|| ServiceError::InvalidInput(format!("Unknown role: {}", role)))?;
    let filter = match role {
        UserRole::Administrator => UserFilter {
            is_superuser: Some(true),
            ..UserFilter::default()
        },
        UserRole::Doctor | UserRole::Staff => UserFilter {
            is_superuser: Some(false),
            is_staff: Some(true),
            ..UserFilter::default()
        },
        UserRole::Patient => UserFilter {
            is_superuser: Some(false),
            is_staff: Some(false),
            ..UserFilter::default()
        },
    };
    Ok(filter)
}

fn parse_status(status: &str) -> Result<bool, ServiceError> {
    match status {
        "Active" => Ok(true),
        "Suspended" => Ok(false),
        other => Err(ServiceError::InvalidInput(format!(
            "Unknown status filter: {}",
            other
        ))),
    }
}

fn parse_object_id(hex: &str) -> Result<ObjectId, ServiceError> {
    // Malformed ids are indistinguishable from missing documents (404)
    ObjectId::parse_str(hex)
        .map_err(|_| ServiceError::NotFound(format!("No document for id: {}", hex)))
}

fn parse_id_list(hex_ids: &[String], what: &str) -> Result<Vec<ObjectId>, ServiceError> {
    hex_ids
        .iter()
        .map(|hex| {
            ObjectId::parse_str(hex)
                .map_err(|_| ServiceError::InvalidInput(format!("Invalid {} id: {}", what, hex)))
        })
        .collect()
}

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn dashboard_stats(&self) -> Result<AdminDashboardStats, ServiceError>;
    async fn list_users(&self, query: UserListQuery) -> Result<UserListResponse, ServiceError>;
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, ServiceError>;
    async fn update_user(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, ServiceError>;
    async fn delete_user(&self, id: &str) -> Result<(), ServiceError>;
    async fn create_permission(
        &self,
        request: CreatePermissionRequest,
    ) -> Result<Permission, ServiceError>;
    async fn list_permissions(&self) -> Result<Vec<Permission>, ServiceError>;
    async fn create_role(&self, request: CreateRoleRequest) -> Result<Role, ServiceError>;
    async fn list_roles(&self) -> Result<Vec<Role>, ServiceError>;
}

pub struct AdminServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub permission_repo: Arc<dyn PermissionRepository>,
    pub role_repo: Arc<dyn RoleRepository>,
    pub medical_record_repo: Arc<dyn MedicalRecordRepository>,
}

#[async_trait]
impl AdminService for AdminServiceImpl {
    #[instrument(skip(self))]
    async fn dashboard_stats(&self) -> Result<AdminDashboardStats, ServiceError> {
        let all = UserFilter::default();
        let total_users = self.user_repo.count(&all).await?;
        let active_users = self
            .user_repo
            .count(&UserFilter {
                is_active: Some(true),
                ..UserFilter::default()
            })
            .await?;
        let administrators = self
            .user_repo
            .count(&bucket_filter(UserRole::Administrator.as_str())?)
            .await?;
        let staff = self
            .user_repo
            .count(&bucket_filter(UserRole::Staff.as_str())?)
            .await?;
        let patients = self
            .user_repo
            .count(&bucket_filter(UserRole::Patient.as_str())?)
            .await?;
        let total_scans = self.medical_record_repo.count_all().await?;
        let abnormal_scans = self
            .medical_record_repo
            .count_matching_diagnosis(&ABNORMAL_KEYWORDS)
            .await?;

        Ok(AdminDashboardStats {
            total_users,
            active_users,
            suspended_users: total_users - active_users,
            administrators,
            staff,
            patients,
            total_scans,
            abnormal_scans,
        })
    }

    #[instrument(skip(self, query))]
    async fn list_users(&self, query: UserListQuery) -> Result<UserListResponse, ServiceError> {
        let mut filter = match query.role.as_deref() {
            Some(role) => bucket_filter(role)?,
            None => UserFilter::default(),
        };
        if let Some(ref status) = query.status {
            filter.is_active = Some(parse_status(status)?);
        }

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

        let users = self.user_repo.list(&filter, page, limit).await?;
        let total = self.user_repo.count(&filter).await?;

        Ok(UserListResponse {
            users: users.into_iter().map(UserResponse::from).collect(),
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, ServiceError> {
        let role = UserRole::parse(&request.role)
            .ok_or_else(|| ServiceError::InvalidInput(format!("Unknown role: {}", request.role)))?;

        if self
            .user_repo
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            warn!("User creation rejected, email already in use");
            return Err(ServiceError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let hash = PasswordUtilsImpl::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;

        let (is_superuser, is_staff) = role.flags();
        let user = User {
            id: None,
            email: request.email,
            password_hash: hash,
            full_name: request.full_name,
            // Admin-created accounts skip email verification
            is_active: true,
            is_superuser,
            is_staff,
            roles: Vec::new(),
            extra_permissions: Vec::new(),
            created_at: None,
            updated_at: None,
        };
        let user = self.user_repo.insert(user).await?;
        info!("User created by admin");
        Ok(UserResponse::from(user))
    }

    #[instrument(skip(self, request), fields(user_id = %id))]
    async fn update_user(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, ServiceError> {
        let id = parse_object_id(id)?;

        let mut update = UserUpdate {
            full_name: request.full_name,
            ..UserUpdate::default()
        };
        if let Some(ref status) = request.status {
            update.is_active = Some(parse_status(status)?);
        }
        if let Some(ref role) = request.role {
            let role = UserRole::parse(role)
                .ok_or_else(|| ServiceError::InvalidInput(format!("Unknown role: {}", role)))?;
            let (is_superuser, is_staff) = role.flags();
            update.is_superuser = Some(is_superuser);
            update.is_staff = Some(is_staff);
        }
        if let Some(ref roles) = request.roles {
            update.roles = Some(parse_id_list(roles, "role")?);
        }
        if let Some(ref perms) = request.extra_permissions {
            update.extra_permissions = Some(parse_id_list(perms, "permission")?);
        }

        let user = self.user_repo.apply_update(id, update).await?;
        info!("User updated");
        Ok(UserResponse::from(user))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_object_id(id)?;
        let user = self
            .user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No user found for ID: {}", id)))?;

        if user.is_superuser {
            warn!("Refused to delete superuser");
            return Err(ServiceError::Forbidden(
                "Superuser accounts cannot be deleted".to_string(),
            ));
        }

        self.user_repo.delete(id).await?;
        info!("User deleted");
        Ok(())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_permission(
        &self,
        request: CreatePermissionRequest,
    ) -> Result<Permission, ServiceError> {
        if self
            .permission_repo
            .find_by_name(&request.name)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Permission already exists: {}",
                request.name
            )));
        }
        let permission = Permission {
            id: None,
            name: request.name,
            description: request.description,
            created_at: None,
        };
        let permission = self.permission_repo.insert(permission).await?;
        info!("Permission created");
        Ok(permission)
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, ServiceError> {
        Ok(self.permission_repo.list().await?)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_role(&self, request: CreateRoleRequest) -> Result<Role, ServiceError> {
        if self.role_repo.find_by_name(&request.name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Role already exists: {}",
                request.name
            )));
        }
        let role = Role {
            id: None,
            name: request.name,
            description: request.description,
            permissions: parse_id_list(&request.permissions, "permission")?,
            created_at: None,
        };
        let role = self.role_repo.insert(role).await?;
        info!("Role created");
        Ok(role)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
        Ok(self.role_repo.list().await?)
    }
}
