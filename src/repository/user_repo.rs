use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::error;

use crate::model::user::User;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::USERS_COLLECTION;

/// Flag-based filter for the admin listing and the patient queries.
/// `None` fields are not constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_staff: Option<bool>,
}

impl UserFilter {
    fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(active) = self.is_active {
            filter.insert("is_active", active);
        }
        if let Some(superuser) = self.is_superuser {
            filter.insert("is_superuser", superuser);
        }
        if let Some(staff) = self.is_staff {
            filter.insert("is_staff", staff);
        }
        filter
    }
}

/// Partial update applied as a single `$set`; absent fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_staff: Option<bool>,
    pub roles: Option<Vec<ObjectId>>,
    pub extra_permissions: Option<Vec<ObjectId>>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
            && self.is_staff.is_none()
            && self.roles.is_none()
            && self.extra_permissions.is_none()
            && self.password_hash.is_none()
    }

    fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(ref full_name) = self.full_name {
            set.insert("full_name", full_name);
        }
        if let Some(active) = self.is_active {
            set.insert("is_active", active);
        }
        if let Some(superuser) = self.is_superuser {
            set.insert("is_superuser", superuser);
        }
        if let Some(staff) = self.is_staff {
            set.insert("is_staff", staff);
        }
        if let Some(ref roles) = self.roles {
            set.insert("roles", roles.clone());
        }
        if let Some(ref perms) = self.extra_permissions {
            set.insert("extra_permissions", perms.clone());
        }
        if let Some(ref hash) = self.password_hash {
            set.insert("password_hash", hash);
        }
        set.insert("updated_at", chrono::Utc::now().to_rfc3339());
        set
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    /// Batched fetch used to join patient names onto scan listings.
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>>;
    async fn list(&self, filter: &UserFilter, page: u32, limit: u32) -> RepositoryResult<Vec<User>>;
    async fn count(&self, filter: &UserFilter) -> RepositoryResult<u64>;
    async fn apply_update(&self, id: ObjectId, update: UserUpdate) -> RepositoryResult<User>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct UserRepositoryImpl {
    collection: mongodb::Collection<User>,
}

impl UserRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        UserRepositoryImpl {
            collection: db.collection::<User>(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        // The unique index on email turns racing inserts into AlreadyExists
        self.collection.insert_one(user.clone(), None).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "email": email };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let filter = doc! { "_id": id };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let mut cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find users by ids: {}", e)))?;
        let mut users = Vec::new();
        while let Some(user) = cursor.next().await {
            match user {
                Ok(u) => users.push(u),
                Err(e) => {
                    error!("Failed to deserialize user: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize user: {}",
                        e
                    )));
                }
            }
        }
        Ok(users)
    }

    async fn list(&self, filter: &UserFilter, page: u32, limit: u32) -> RepositoryResult<Vec<User>> {
        let page = page.max(1);
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(((page - 1) * limit) as u64)
            .limit(limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(filter.to_document(), options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list users: {}", e)))?;
        let mut users = Vec::new();
        while let Some(user) = cursor.next().await {
            match user {
                Ok(u) => users.push(u),
                Err(e) => {
                    error!("Failed to deserialize user: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize user: {}",
                        e
                    )));
                }
            }
        }
        Ok(users)
    }

    async fn count(&self, filter: &UserFilter) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(filter.to_document(), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count users: {}", e)))?;
        Ok(count)
    }

    async fn apply_update(&self, id: ObjectId, update: UserUpdate) -> RepositoryResult<User> {
        let filter = doc! { "_id": id };
        if !update.is_empty() {
            let set = update.to_set_document();
            let result = self
                .collection
                .update_one(filter.clone(), doc! { "$set": set }, None)
                .await
                .map_err(|e| RepositoryError::database(format!("Failed to update user: {}", e)))?;
            if result.matched_count == 0 {
                return Err(RepositoryError::not_found(format!(
                    "No user found to update for ID: {}",
                    id
                )));
            }
        }
        let user = self.find_by_id(&id).await?;
        user.ok_or_else(|| RepositoryError::not_found(format!("No user found for ID: {}", id)))
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let filter = doc! { "_id": id };
        let result = self
            .collection
            .delete_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No user found to delete for ID: {}",
                id
            )));
        }
        Ok(())
    }
}
