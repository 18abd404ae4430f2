//! Rating (avaliação) models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A patient's 1-5 score for a completed appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub appointment_id: String,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: String,
}

impl Rating {
    pub fn from_input(input: RatingInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            appointment_id: input.appointment_id,
            score: input.score,
            comment: input.comment,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Rating request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingInput {
    #[validate(length(min = 1, message = "appointment id is required"))]
    pub appointment_id: String,
    #[validate(range(min = 1, max = 5, message = "score must be between 1 and 5"))]
    pub score: u8,
    #[serde(default)]
    pub comment: Option<String>,
}
