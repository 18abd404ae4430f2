//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A patient profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// UUID, generated locally
    pub id: String,
    /// Full name
    pub name: String,
    /// Brazilian taxpayer id, unique
    pub cpf: String,
    /// Contact email, unique
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Postal address
    pub address: Option<String>,
    /// Free-text medical history
    pub medical_history: Option<String>,
    /// Soft-delete flag
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    /// Create a new active patient from validated input.
    pub fn from_input(input: PatientInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            cpf: input.cpf,
            email: input.email,
            phone: input.phone,
            birth_date: input.birth_date,
            address: input.address,
            medical_history: input.medical_history,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Overwrite the editable fields, keeping id, status and creation time.
    pub fn apply(&mut self, input: PatientInput) {
        self.name = input.name;
        self.cpf = input.cpf;
        self.email = input.email;
        self.phone = input.phone;
        self.birth_date = input.birth_date;
        self.address = input.address;
        self.medical_history = input.medical_history;
    }
}

/// Patient registration / update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 11, max = 14, message = "cpf must have 11 to 14 characters"))]
    pub cpf: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "phone is required"))]
    pub phone: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(email: &str, cpf: &str) -> PatientInput {
        PatientInput {
            name: "Maria Silva".into(),
            cpf: cpf.into(),
            email: email.into(),
            phone: "11988888888".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 8, 20).unwrap(),
            address: None,
            medical_history: Some("Type 2 diabetes".into()),
        }
    }

    #[test]
    fn test_new_patient() {
        let patient = Patient::from_input(sample_input("maria@email.com", "234.567.890-11"));
        assert_eq!(patient.name, "Maria Silva");
        assert!(patient.active);
        assert_eq!(patient.id.len(), 36); // UUID format
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut patient = Patient::from_input(sample_input("maria@email.com", "234.567.890-11"));
        let id = patient.id.clone();
        let created_at = patient.created_at.clone();

        let mut update = sample_input("maria.silva@email.com", "234.567.890-11");
        update.phone = "11977777777".into();
        patient.apply(update);

        assert_eq!(patient.id, id);
        assert_eq!(patient.created_at, created_at);
        assert_eq!(patient.email, "maria.silva@email.com");
        assert_eq!(patient.phone, "11977777777");
    }

    #[test]
    fn test_input_deserializes_camel_case() {
        let json = r#"{
            "name": "Carlos",
            "cpf": "345.678.901-22",
            "email": "carlos@email.com",
            "phone": "11977777777",
            "birthDate": "1995-02-10"
        }"#;
        let input: PatientInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.birth_date, NaiveDate::from_ymd_opt(1995, 2, 10).unwrap());
        assert!(input.medical_history.is_none());
        assert!(input.validate().is_ok());
    }
}
