use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::error;

use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::APPOINTMENTS_COLLECTION;

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn insert(&self, appointment: Appointment) -> RepositoryResult<Appointment>;
    /// Lists appointments, optionally scoped to one patient, newest first.
    async fn list(
        &self,
        patient_id: Option<ObjectId>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Appointment>>;
    async fn count(&self, patient_id: Option<ObjectId>) -> RepositoryResult<u64>;
    async fn update_status(
        &self,
        id: ObjectId,
        status: AppointmentStatus,
    ) -> RepositoryResult<Appointment>;
}

pub struct AppointmentRepositoryImpl {
    collection: mongodb::Collection<Appointment>,
}

impl AppointmentRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        AppointmentRepositoryImpl {
            collection: db.collection::<Appointment>(APPOINTMENTS_COLLECTION),
        }
    }

    fn scope_filter(patient_id: Option<ObjectId>) -> Document {
        match patient_id {
            Some(id) => doc! { "patient_id": id },
            None => Document::new(),
        }
    }
}

#[async_trait]
impl AppointmentRepository for AppointmentRepositoryImpl {
    async fn insert(&self, mut appointment: Appointment) -> RepositoryResult<Appointment> {
        appointment.id = Some(ObjectId::new());
        appointment.created_at = Some(chrono::Utc::now().to_rfc3339());
        self.collection
            .insert_one(appointment.clone(), None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to insert appointment: {}", e))
            })?;
        Ok(appointment)
    }

    async fn list(
        &self,
        patient_id: Option<ObjectId>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Appointment>> {
        let page = page.max(1);
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(((page - 1) * limit) as u64)
            .limit(limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(Self::scope_filter(patient_id), options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list appointments: {}", e)))?;
        let mut appointments = Vec::new();
        while let Some(appointment) = cursor.next().await {
            match appointment {
                Ok(a) => appointments.push(a),
                Err(e) => {
                    error!("Failed to deserialize appointment: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize appointment: {}",
                        e
                    )));
                }
            }
        }
        Ok(appointments)
    }

    async fn count(&self, patient_id: Option<ObjectId>) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(Self::scope_filter(patient_id), None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to count appointments: {}", e))
            })?;
        Ok(count)
    }

    async fn update_status(
        &self,
        id: ObjectId,
        status: AppointmentStatus,
    ) -> RepositoryResult<Appointment> {
        let status_bson = bson::to_bson(&status)?;
        let filter = doc! { "_id": id };
        let update = doc! { "$set": { "status": status_bson } };
        let result = self
            .collection
            .update_one(filter.clone(), update, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to update appointment: {}", e))
            })?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No appointment found for ID: {}",
                id
            )));
        }
        let appointment = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch appointment: {}", e)))?;
        appointment
            .ok_or_else(|| RepositoryError::not_found(format!("No appointment found for ID: {}", id)))
    }
}
