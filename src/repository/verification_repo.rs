use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;

use crate::model::verification::VerificationRecord;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::AUTHENTICATION_COLLECTION;

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn insert(&self, record: VerificationRecord) -> RepositoryResult<VerificationRecord>;
    /// Looks up an unconsumed verify record by its code.
    async fn find_active_by_code(&self, code: &str) -> RepositoryResult<Option<VerificationRecord>>;
    async fn mark_verified(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct VerificationRepositoryImpl {
    collection: mongodb::Collection<VerificationRecord>,
}

impl VerificationRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        VerificationRepositoryImpl {
            collection: db.collection::<VerificationRecord>(AUTHENTICATION_COLLECTION),
        }
    }
}

#[async_trait]
impl VerificationRepository for VerificationRepositoryImpl {
    async fn insert(&self, mut record: VerificationRecord) -> RepositoryResult<VerificationRecord> {
        record.id = Some(ObjectId::new());
        record.created_at = Some(chrono::Utc::now().to_rfc3339());
        self.collection
            .insert_one(record.clone(), None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to insert verification record: {}", e))
            })?;
        Ok(record)
    }

    async fn find_active_by_code(&self, code: &str) -> RepositoryResult<Option<VerificationRecord>> {
        let filter = doc! {
            "auth_code": code,
            "record_type": "verify",
            "is_verified": false,
        };
        let record = self.collection.find_one(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to find verification record: {}", e))
        })?;
        Ok(record)
    }

    async fn mark_verified(&self, id: ObjectId) -> RepositoryResult<()> {
        let filter = doc! { "_id": id };
        let update = doc! { "$set": {
            "is_verified": true,
            "verified_at": chrono::Utc::now().to_rfc3339(),
        }};
        let result = self
            .collection
            .update_one(filter, update, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to mark record verified: {}", e))
            })?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No verification record found for ID: {}",
                id
            )));
        }
        Ok(())
    }
}
