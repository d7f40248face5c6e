use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};

use crate::handler::clinical_handler::{
    dashboard_stats_handler, get_scan_handler, list_patients_handler, recent_patients_handler,
    recent_scans_handler,
};
use crate::middlewares::auth_middleware::{staff_auth, AuthState};
use crate::service::clinical_service::ClinicalService;

pub fn clinical_router(service: Arc<dyn ClinicalService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/doctor/dashboard-stats", get(dashboard_stats_handler))
        .route("/doctor/recent-scans", get(recent_scans_handler))
        .route("/doctor/recent-patients", get(recent_patients_handler))
        .route("/doctor/patients", get(list_patients_handler))
        .route("/doctor/scan/:id", get(get_scan_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, staff_auth))
        .with_state(service)
}
