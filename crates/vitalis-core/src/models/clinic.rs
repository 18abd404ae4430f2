//! Clinic models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A clinic offering procedures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: String,
    /// Public-facing name
    pub trade_name: String,
    /// Registered company name
    pub legal_name: String,
    pub specialty: String,
    pub address: String,
    /// Mean patient rating, 0.0 until the first rating arrives
    pub rating: f64,
    pub active: bool,
    pub created_at: String,
}

impl Clinic {
    /// Create a new active, unrated clinic.
    pub fn from_input(input: ClinicInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trade_name: input.trade_name,
            legal_name: input.legal_name,
            specialty: input.specialty,
            address: input.address,
            rating: 0.0,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn apply(&mut self, input: ClinicInput) {
        self.trade_name = input.trade_name;
        self.legal_name = input.legal_name;
        self.specialty = input.specialty;
        self.address = input.address;
    }
}

/// Clinic registration / update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClinicInput {
    #[validate(length(min = 1, message = "trade name is required"))]
    pub trade_name: String,
    #[validate(length(min = 1, message = "legal name is required"))]
    pub legal_name: String,
    #[validate(length(min = 1, message = "specialty is required"))]
    pub specialty: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clinic_is_active_and_unrated() {
        let clinic = Clinic::from_input(ClinicInput {
            trade_name: "Vitalis Cardio".into(),
            legal_name: "Vitalis Cardiologia LTDA".into(),
            specialty: "Cardiology".into(),
            address: "Av. Paulista, 1000".into(),
        });
        assert!(clinic.active);
        assert_eq!(clinic.rating, 0.0);
    }

    #[test]
    fn test_blank_fields_rejected() {
        let input = ClinicInput {
            trade_name: "".into(),
            legal_name: "X".into(),
            specialty: "".into(),
            address: "Y".into(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("trade_name"));
        assert!(errors.field_errors().contains_key("specialty"));
    }
}
