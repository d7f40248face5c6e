use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
}
