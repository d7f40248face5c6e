use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::error;

use crate::model::medical_record::MedicalRecord;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::MEDICAL_RECORDS_COLLECTION;

/// Read-only access to the scan collection. Records are written by the
/// imaging pipeline, not by this service.
#[async_trait]
pub trait MedicalRecordRepository: Send + Sync {
    async fn count_all(&self) -> RepositoryResult<u64>;
    /// Counts records whose diagnosis text matches any keyword,
    /// case-insensitively.
    async fn count_matching_diagnosis(&self, keywords: &[&str]) -> RepositoryResult<u64>;
    /// Counts records created at or after the given RFC 3339 instant.
    async fn count_created_since(&self, since: &str) -> RepositoryResult<u64>;
    async fn find_recent(&self, limit: i64) -> RepositoryResult<Vec<MedicalRecord>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<MedicalRecord>>;
}

pub struct MedicalRecordRepositoryImpl {
    collection: mongodb::Collection<MedicalRecord>,
}

impl MedicalRecordRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        MedicalRecordRepositoryImpl {
            collection: db.collection::<MedicalRecord>(MEDICAL_RECORDS_COLLECTION),
        }
    }

    fn keyword_filter(keywords: &[&str]) -> Document {
        let clauses: Vec<Document> = keywords
            .iter()
            .map(|kw| doc! { "diagnosis": { "$regex": *kw, "$options": "i" } })
            .collect();
        doc! { "$or": clauses }
    }
}

#[async_trait]
impl MedicalRecordRepository for MedicalRecordRepositoryImpl {
    async fn count_all(&self) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count records: {}", e)))?;
        Ok(count)
    }

    async fn count_matching_diagnosis(&self, keywords: &[&str]) -> RepositoryResult<u64> {
        if keywords.is_empty() {
            return Ok(0);
        }
        let count = self
            .collection
            .count_documents(Self::keyword_filter(keywords), None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to count matching records: {}", e))
            })?;
        Ok(count)
    }

    async fn count_created_since(&self, since: &str) -> RepositoryResult<u64> {
        // RFC 3339 strings in UTC order lexicographically
        let filter = doc! { "created_at": { "$gte": since } };
        let count = self
            .collection
            .count_documents(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count records: {}", e)))?;
        Ok(count)
    }

    async fn find_recent(&self, limit: i64) -> RepositoryResult<Vec<MedicalRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .build();
        let mut cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list records: {}", e)))?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            match record {
                Ok(r) => records.push(r),
                Err(e) => {
                    error!("Failed to deserialize medical record: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize medical record: {}",
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<MedicalRecord>> {
        let filter = doc! { "_id": id };
        let record = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find record by id: {}", e)))?;
        Ok(record)
    }
}
