use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<ObjectId>,
    pub created_at: Option<String>,
}
