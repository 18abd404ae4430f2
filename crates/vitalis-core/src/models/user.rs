//! Account and authentication models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Back-office administrator
    Admin,
    /// Clinic staff account, owns one clinic profile
    Clinic,
    /// Patient account, owns one patient profile
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Clinic => "CLINIC",
            Role::Patient => "PATIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "CLINIC" => Ok(Role::Clinic),
            "PATIENT" => Ok(Role::Patient),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A login account.
///
/// `profile_id` is the explicit owning reference to the patient or clinic
/// profile this account acts for. Admin accounts have none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Encoded password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub profile_id: Option<String>,
    pub active: bool,
    pub created_at: String,
}

impl User {
    /// Create a new active account.
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        role: Role,
        profile_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role,
            profile_id,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Self-registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "password must have 6 to 128 characters"))]
    pub password: String,
    pub role: Role,
    /// Patient or clinic the account should act for
    #[serde(default)]
    pub profile_id: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: String,
    pub token_type: String,
    pub role: Role,
    pub expires_at: String,
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
    pub profile_id: Option<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when this is the patient account owning `patient_id`.
    pub fn is_patient(&self, patient_id: &str) -> bool {
        self.role == Role::Patient && self.profile_id.as_deref() == Some(patient_id)
    }

    /// True when this is the clinic account owning `clinic_id`.
    pub fn owns_clinic(&self, clinic_id: &str) -> bool {
        self.role == Role::Clinic && self.profile_id.as_deref() == Some(clinic_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Admin, Role::Clinic, Role::Patient] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("ROLE_ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "Ana".into(),
            "ana@example.com".into(),
            "pbkdf2-sha256$1$00$00".into(),
            Role::Patient,
            None,
        );
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "PATIENT");
    }

    #[test]
    fn test_principal_ownership() {
        let clinic = Principal {
            user_id: "u1".into(),
            role: Role::Clinic,
            profile_id: Some("c1".into()),
        };
        assert!(clinic.owns_clinic("c1"));
        assert!(!clinic.owns_clinic("c2"));
        assert!(!clinic.is_patient("c1"));
        assert!(!clinic.is_admin());
    }

    #[test]
    fn test_new_account_validation() {
        let account = NewAccount {
            name: "".into(),
            email: "not-an-email".into(),
            password: "123".into(),
            role: Role::Patient,
            profile_id: None,
        };
        let errors = account.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
