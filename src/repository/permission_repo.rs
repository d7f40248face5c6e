use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::error;

use crate::model::permission::Permission;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::PERMISSIONS_COLLECTION;

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn insert(&self, permission: Permission) -> RepositoryResult<Permission>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Permission>>;
    async fn list(&self) -> RepositoryResult<Vec<Permission>>;
}

pub struct PermissionRepositoryImpl {
    collection: mongodb::Collection<Permission>,
}

impl PermissionRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        PermissionRepositoryImpl {
            collection: db.collection::<Permission>(PERMISSIONS_COLLECTION),
        }
    }
}

#[async_trait]
impl PermissionRepository for PermissionRepositoryImpl {
    async fn insert(&self, mut permission: Permission) -> RepositoryResult<Permission> {
        permission.id = Some(ObjectId::new());
        permission.created_at = Some(chrono::Utc::now().to_rfc3339());
        // Unique name index settles the existence-check race as AlreadyExists
        self.collection.insert_one(permission.clone(), None).await?;
        Ok(permission)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Permission>> {
        let filter = doc! { "name": name };
        let permission = self.collection.find_one(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to find permission by name: {}", e))
        })?;
        Ok(permission)
    }

    async fn list(&self) -> RepositoryResult<Vec<Permission>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let mut cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list permissions: {}", e)))?;
        let mut permissions = Vec::new();
        while let Some(permission) = cursor.next().await {
            match permission {
                Ok(p) => permissions.push(p),
                Err(e) => {
                    error!("Failed to deserialize permission: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize permission: {}",
                        e
                    )));
                }
            }
        }
        Ok(permissions)
    }
}
