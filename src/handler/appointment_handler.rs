use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;
use axum::Extension;
use validator::Validate;

use crate::dto::appointment_dto::{BookAppointmentRequest, UpdateAppointmentStatusRequest};
use crate::dto::clinical_dto::PageQuery;
use crate::service::appointment_service::AppointmentService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

// Book an appointment for the calling patient
pub async fn book_appointment_handler(
    State(service): State<Arc<dyn AppointmentService>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.book(&claims, payload).await?;
    Ok(Json(res))
}

// List appointments: staff see all, patients their own
pub async fn list_appointments_handler(
    State(service): State<Arc<dyn AppointmentService>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list(&claims, query.page, query.limit).await?;
    Ok(Json(res))
}

// Confirm or cancel (staff gate applied in the router)
pub async fn update_appointment_status_handler(
    State(service): State<Arc<dyn AppointmentService>>,
    Path((id,)): Path<(String,)>,
    Json(payload): Json<UpdateAppointmentStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::bad_request(format!("Validation error: {}", e)));
    }
    let res = service.update_status(&id, &payload.status).await?;
    Ok(Json(res))
}
