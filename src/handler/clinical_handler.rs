use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;

use crate::dto::clinical_dto::{LimitQuery, PageQuery};
use crate::service::clinical_service::ClinicalService;
use crate::util::error::HandlerError;

// Dashboard stats (doctor/admin)
pub async fn dashboard_stats_handler(
    State(service): State<Arc<dyn ClinicalService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = service.dashboard_stats().await?;
    Ok(Json(stats))
}

// Recent scans joined with patient names
pub async fn recent_scans_handler(
    State(service): State<Arc<dyn ClinicalService>>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.recent_scans(query.limit).await?;
    Ok(Json(res))
}

// Recently registered patients
pub async fn recent_patients_handler(
    State(service): State<Arc<dyn ClinicalService>>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.recent_patients(query.limit).await?;
    Ok(Json(res))
}

// Paginated patient listing
pub async fn list_patients_handler(
    State(service): State<Arc<dyn ClinicalService>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_patients(query.page, query.limit).await?;
    Ok(Json(res))
}

// Single scan with patient join
pub async fn get_scan_handler(
    State(service): State<Arc<dyn ClinicalService>>,
    Path((id,)): Path<(String,)>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_scan(&id).await?;
    Ok(Json(res))
}
