use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::instrument;

use crate::dto::clinical_dto::{ClinicalDashboardStats, PatientListResponse, ScanResponse};
use crate::dto::user_dto::UserResponse;
use crate::model::medical_record::MedicalRecord;
use crate::repository::medical_record_repo::MedicalRecordRepository;
use crate::repository::user_repo::{UserFilter, UserRepository};
use crate::util::error::ServiceError;

/// Keywords that flag a free-text diagnosis as abnormal. A display
/// heuristic, not a clinical decision.
pub const ABNORMAL_KEYWORDS: [&str; 4] = ["abnormal", "suspicious", "concerning", "positive"];

const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_RECENT_LIMIT: u32 = 5;

/// Case-insensitive substring match against the keyword list.
pub fn classify_diagnosis(diagnosis: Option<&str>) -> &'static str {
    let Some(diagnosis) = diagnosis else {
        return "Normal";
    };
    let lowered = diagnosis.to_lowercase();
    if ABNORMAL_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        "Abnormal"
    } else {
        "Normal"
    }
}

fn patient_filter() -> UserFilter {
    UserFilter {
        is_superuser: Some(false),
        is_staff: Some(false),
        ..UserFilter::default()
    }
}

#[async_trait]
pub trait ClinicalService: Send + Sync {
    async fn dashboard_stats(&self) -> Result<ClinicalDashboardStats, ServiceError>;
    async fn recent_scans(&self, limit: Option<u32>) -> Result<Vec<ScanResponse>, ServiceError>;
    async fn recent_patients(&self, limit: Option<u32>) -> Result<Vec<UserResponse>, ServiceError>;
    async fn list_patients(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PatientListResponse, ServiceError>;
    async fn get_scan(&self, id: &str) -> Result<ScanResponse, ServiceError>;
}

pub struct ClinicalServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub medical_record_repo: Arc<dyn MedicalRecordRepository>,
}

impl ClinicalServiceImpl {
    /// Joins patient display names onto scans with one batched `$in`
    /// lookup instead of a per-record query.
    async fn join_patients(
        &self,
        records: Vec<MedicalRecord>,
    ) -> Result<Vec<ScanResponse>, ServiceError> {
        let mut patient_ids: Vec<ObjectId> = records.iter().map(|r| r.patient_id).collect();
        patient_ids.sort();
        patient_ids.dedup();

        let patients = self.user_repo.find_by_ids(&patient_ids).await?;
        let names: HashMap<ObjectId, String> = patients
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id, p.full_name)))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| {
                let patient_name = names.get(&record.patient_id).cloned();
                scan_response(record, patient_name)
            })
            .collect())
    }
}

fn scan_response(record: MedicalRecord, patient_name: Option<String>) -> ScanResponse {
    let status = classify_diagnosis(record.diagnosis.as_deref()).to_string();
    ScanResponse {
        id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
        patient_id: record.patient_id.to_hex(),
        patient_name,
        scan_type: record.scan_type,
        diagnosis: record.diagnosis,
        status,
        image_url: record.image_url,
        created_at: record.created_at,
    }
}

#[async_trait]
impl ClinicalService for ClinicalServiceImpl {
    #[instrument(skip(self))]
    async fn dashboard_stats(&self) -> Result<ClinicalDashboardStats, ServiceError> {
        let total_scans = self.medical_record_repo.count_all().await?;
        let total_patients = self.user_repo.count(&patient_filter()).await?;
        let abnormal_scans = self
            .medical_record_repo
            .count_matching_diagnosis(&ABNORMAL_KEYWORDS)
            .await?;

        // Start of the current UTC day; RFC 3339 strings compare
        // lexicographically in chronological order
        let today = format!("{}T00:00:00+00:00", Utc::now().date_naive());
        let scans_today = self.medical_record_repo.count_created_since(&today).await?;

        Ok(ClinicalDashboardStats {
            total_scans,
            total_patients,
            abnormal_scans,
            scans_today,
        })
    }

    #[instrument(skip(self))]
    async fn recent_scans(&self, limit: Option<u32>) -> Result<Vec<ScanResponse>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, 50);
        let records = self.medical_record_repo.find_recent(limit as i64).await?;
        self.join_patients(records).await
    }

    #[instrument(skip(self))]
    async fn recent_patients(&self, limit: Option<u32>) -> Result<Vec<UserResponse>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, 50);
        let patients = self.user_repo.list(&patient_filter(), 1, limit).await?;
        Ok(patients.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_patients(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PatientListResponse, ServiceError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
        let filter = patient_filter();

        let patients = self.user_repo.list(&filter, page, limit).await?;
        let total = self.user_repo.count(&filter).await?;

        Ok(PatientListResponse {
            patients: patients.into_iter().map(UserResponse::from).collect(),
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self), fields(scan_id = %id))]
    async fn get_scan(&self, id: &str) -> Result<ScanResponse, ServiceError> {
        let id = ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound(format!("No scan found for id: {}", id)))?;
        let record = self
            .medical_record_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No scan found for ID: {}", id)))?;

        let patient = self.user_repo.find_by_id(&record.patient_id).await?;
        let patient_name = patient.map(|p| p.full_name);
        Ok(scan_response(record, patient_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_normal() {
        assert_eq!(classify_diagnosis(Some("No findings")), "Normal");
        assert_eq!(classify_diagnosis(None), "Normal");
    }

    #[test]
    fn test_classify_keywords_case_insensitive() {
        assert_eq!(classify_diagnosis(Some("ABNORMAL growth")), "Abnormal");
        assert_eq!(classify_diagnosis(Some("possibly Suspicious mass")), "Abnormal");
        assert_eq!(classify_diagnosis(Some("concerning density")), "Abnormal");
        assert_eq!(classify_diagnosis(Some("tested positive")), "Abnormal");
    }

    #[test]
    fn test_classify_matches_substrings() {
        // Plain substring match: "positively" contains "positive"
        assert_eq!(classify_diagnosis(Some("positively clear")), "Abnormal");
    }
}
