use serde::{Deserialize, Serialize};

use crate::dto::user_dto::UserResponse;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicalDashboardStats {
    pub total_scans: u64,
    pub total_patients: u64,
    pub abnormal_scans: u64,
    pub scans_today: u64,
}

/// One scan joined with its patient's display name.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub id: String,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub scan_type: String,
    pub diagnosis: Option<String>,
    /// "Abnormal" when the diagnosis matches the keyword heuristic
    pub status: String,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientListResponse {
    pub patients: Vec<UserResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
