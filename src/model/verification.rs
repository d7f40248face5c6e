use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One-time email verification record. Consumed (marked verified) by a
/// successful `/auth/verify` call; codes carry no expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub auth_code: String,
    pub record_type: String, // "verify"
    pub is_verified: bool,
    pub created_at: Option<String>,
    pub verified_at: Option<String>,
}

impl VerificationRecord {
    pub fn new_verify(user_id: ObjectId, auth_code: String) -> Self {
        VerificationRecord {
            id: None,
            user_id,
            auth_code,
            record_type: "verify".to_string(),
            is_verified: false,
            created_at: None,
            verified_at: None,
        }
    }
}
