use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::error;

use crate::model::role::Role;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::ROLES_COLLECTION;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn insert(&self, role: Role) -> RepositoryResult<Role>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Role>>;
    async fn list(&self) -> RepositoryResult<Vec<Role>>;
}

pub struct RoleRepositoryImpl {
    collection: mongodb::Collection<Role>,
}

impl RoleRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        RoleRepositoryImpl {
            collection: db.collection::<Role>(ROLES_COLLECTION),
        }
    }
}

#[async_trait]
impl RoleRepository for RoleRepositoryImpl {
    async fn insert(&self, mut role: Role) -> RepositoryResult<Role> {
        role.id = Some(ObjectId::new());
        role.created_at = Some(chrono::Utc::now().to_rfc3339());
        self.collection.insert_one(role.clone(), None).await?;
        Ok(role)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        let filter = doc! { "name": name };
        let role = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find role by name: {}", e)))?;
        Ok(role)
    }

    async fn list(&self) -> RepositoryResult<Vec<Role>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let mut cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list roles: {}", e)))?;
        let mut roles = Vec::new();
        while let Some(role) = cursor.next().await {
            match role {
                Ok(r) => roles.push(r),
                Err(e) => {
                    error!("Failed to deserialize role: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize role: {}",
                        e
                    )));
                }
            }
        }
        Ok(roles)
    }
}
