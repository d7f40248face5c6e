use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One scan/diagnosis event for a patient. This service only reads the
/// collection; records are produced elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub patient_id: ObjectId,
    pub scan_type: String,
    /// Free-text diagnosis; abnormality is a keyword heuristic over this
    pub diagnosis: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<bson::Document>,
    pub created_at: Option<String>,
}
