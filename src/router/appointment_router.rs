use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::{middleware, Router};

use crate::handler::appointment_handler::{
    book_appointment_handler, list_appointments_handler, update_appointment_status_handler,
};
use crate::middlewares::auth_middleware::{staff_auth, token_auth, AuthState};
use crate::service::appointment_service::AppointmentService;

pub fn appointment_router(
    service: Arc<dyn AppointmentService>,
    auth_state: Arc<AuthState>,
) -> Router {
    // Booking and listing only need a valid token; status changes are
    // reserved for staff accounts.
    let patient = Router::new()
        .route("/appointments", post(book_appointment_handler))
        .route("/appointments", get(list_appointments_handler))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            token_auth,
        ));

    let staff = Router::new()
        .route(
            "/appointments/:id/status",
            patch(update_appointment_status_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, staff_auth));

    patient.merge(staff).with_state(service)
}
