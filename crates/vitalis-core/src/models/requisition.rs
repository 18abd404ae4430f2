//! Requisition models: internal administrative tickets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Requisition workflow status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequisitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionStatus::Pending => "PENDING",
            RequisitionStatus::InProgress => "IN_PROGRESS",
            RequisitionStatus::Completed => "COMPLETED",
            RequisitionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequisitionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequisitionStatus::Pending),
            "IN_PROGRESS" => Ok(RequisitionStatus::InProgress),
            "COMPLETED" => Ok(RequisitionStatus::Completed),
            "CANCELLED" => Ok(RequisitionStatus::Cancelled),
            other => Err(format!("Unknown requisition status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl RequisitionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionPriority::Low => "LOW",
            RequisitionPriority::Medium => "MEDIUM",
            RequisitionPriority::High => "HIGH",
            RequisitionPriority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for RequisitionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequisitionPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(RequisitionPriority::Low),
            "MEDIUM" => Ok(RequisitionPriority::Medium),
            "HIGH" => Ok(RequisitionPriority::High),
            "URGENT" => Ok(RequisitionPriority::Urgent),
            other => Err(format!("Unknown requisition priority: {}", other)),
        }
    }
}

/// An internal administrative ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: RequisitionStatus,
    pub priority: RequisitionPriority,
    pub requester: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Requisition {
    pub fn from_input(input: RequisitionInput) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            requester: input.requester,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Replace every editable field, keeping id and created_at.
    pub fn apply(&mut self, input: RequisitionInput) {
        self.title = input.title;
        self.description = input.description;
        self.status = input.status;
        self.priority = input.priority;
        self.requester = input.requester;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

fn default_status() -> RequisitionStatus {
    RequisitionStatus::Pending
}

/// Requisition create / update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionInput {
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: RequisitionStatus,
    pub priority: RequisitionPriority,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub requester: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, requester: &str) -> RequisitionInput {
        RequisitionInput {
            title: title.into(),
            description: "Replace the waiting room printer".into(),
            status: RequisitionStatus::Pending,
            priority: RequisitionPriority::Medium,
            requester: requester.into(),
        }
    }

    #[test]
    fn test_enum_spellings() {
        assert_eq!(
            serde_json::to_string(&RequisitionStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            "URGENT".parse::<RequisitionPriority>().unwrap(),
            RequisitionPriority::Urgent
        );
        assert!("urgent".parse::<RequisitionPriority>().is_err());
    }

    #[test]
    fn test_length_limits() {
        assert!(input("Printer", "Reception").validate().is_ok());
        assert!(input(&"t".repeat(201), "Reception").validate().is_err());
        assert!(input("Printer", &"r".repeat(101)).validate().is_err());
    }

    #[test]
    fn test_blank_title_rejected() {
        let errors = input("   ", "Reception").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let json = r#"{"title":"T","description":"D","priority":"LOW","requester":"R"}"#;
        let parsed: RequisitionInput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, RequisitionStatus::Pending);
    }
}
