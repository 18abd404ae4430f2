//! Clinical record (prontuário) models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Free-text clinical notes attached to one appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRecord {
    pub id: String,
    pub appointment_id: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    /// Set once on creation
    pub created_at: String,
}

impl ClinicalRecord {
    pub fn new(appointment_id: String, input: RecordInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            appointment_id,
            symptoms: input.symptoms,
            diagnosis: input.diagnosis,
            prescription: input.prescription,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Clinical record request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub symptoms: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub diagnosis: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub prescription: Option<String>,
}
