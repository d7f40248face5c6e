use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument};

use crate::dto::appointment_dto::{AppointmentListResponse, BookAppointmentRequest};
use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::repository::appointment_repo::AppointmentRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::Claims;

const DEFAULT_PAGE_SIZE: u32 = 20;

#[async_trait]
pub trait AppointmentService: Send + Sync {
    async fn book(
        &self,
        claims: &Claims,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, ServiceError>;
    async fn list(
        &self,
        claims: &Claims,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<AppointmentListResponse, ServiceError>;
    async fn update_status(&self, id: &str, status: &str) -> Result<Appointment, ServiceError>;
}

pub struct AppointmentServiceImpl {
    pub appointment_repo: Arc<dyn AppointmentRepository>,
}

#[async_trait]
impl AppointmentService for AppointmentServiceImpl {
    #[instrument(skip(self, claims, request), fields(patient = %claims.sub))]
    async fn book(
        &self,
        claims: &Claims,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, ServiceError> {
        let patient_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Invalid subject in token".to_string()))?;
        let doctor_id = request
            .doctor_id
            .as_deref()
            .map(|hex| {
                ObjectId::parse_str(hex)
                    .map_err(|_| ServiceError::InvalidInput(format!("Invalid doctor id: {}", hex)))
            })
            .transpose()?;

        let appointment = Appointment {
            id: None,
            patient_id,
            doctor_id,
            scheduled_at: request.scheduled_at,
            reason: request.reason,
            status: AppointmentStatus::Pending,
            created_at: None,
        };
        let appointment = self.appointment_repo.insert(appointment).await?;
        info!("Appointment booked");
        Ok(appointment)
    }

    #[instrument(skip(self, claims))]
    async fn list(
        &self,
        claims: &Claims,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<AppointmentListResponse, ServiceError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

        // Staff see the whole book; patients only their own entries
        let scope = if claims.is_staff || claims.is_superuser {
            None
        } else {
            Some(ObjectId::parse_str(&claims.sub).map_err(|_| {
                ServiceError::Unauthorized("Invalid subject in token".to_string())
            })?)
        };

        let appointments = self.appointment_repo.list(scope, page, limit).await?;
        let total = self.appointment_repo.count(scope).await?;

        Ok(AppointmentListResponse {
            appointments,
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self), fields(appointment_id = %id))]
    async fn update_status(&self, id: &str, status: &str) -> Result<Appointment, ServiceError> {
        let id = ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound(format!("No appointment found for id: {}", id)))?;
        let status = match AppointmentStatus::parse(status) {
            Some(AppointmentStatus::Confirmed) => AppointmentStatus::Confirmed,
            Some(AppointmentStatus::Cancelled) => AppointmentStatus::Cancelled,
            _ => {
                return Err(ServiceError::InvalidInput(format!(
                    "Status must be confirmed or cancelled, got: {}",
                    status
                )))
            }
        };
        let appointment = self.appointment_repo.update_status(id, status).await?;
        info!("Appointment status updated");
        Ok(appointment)
    }
}
