//! Procedure catalog models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A billable service offered by one clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: String,
    /// Owning clinic
    pub clinic_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Price charged per appointment
    pub price: Decimal,
    /// Estimated duration
    pub duration_minutes: u32,
    /// Whether patients can currently book it
    pub available: bool,
}

impl Procedure {
    pub fn from_input(input: ProcedureInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            clinic_id: input.clinic_id,
            name: input.name,
            description: input.description,
            price: input.price,
            duration_minutes: input.duration_minutes,
            available: input.available,
        }
    }
}

fn default_available() -> bool {
    true
}

/// Procedure creation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(range(min = 1, message = "duration must be at least one minute"))]
    pub duration_minutes: u32,
    #[serde(default = "default_available")]
    pub available: bool,
    #[validate(length(min = 1, message = "clinic id is required"))]
    pub clinic_id: String,
}

/// A procedure with its clinic's name denormalized for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureListing {
    #[serde(flatten)]
    pub procedure: Procedure,
    pub clinic_name: String,
}
