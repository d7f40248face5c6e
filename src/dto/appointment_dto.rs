use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::appointment::Appointment;

#[derive(Debug, Deserialize, Validate)]
pub struct BookAppointmentRequest {
    /// Requested slot, RFC 3339
    #[validate(length(min = 10))]
    pub scheduled_at: String,
    #[validate(length(min = 2, max = 500))]
    pub reason: String,
    /// Preferred doctor, hex ObjectId
    pub doctor_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAppointmentStatusRequest {
    /// "confirmed" or "cancelled"
    #[validate(length(min = 2, max = 20))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
