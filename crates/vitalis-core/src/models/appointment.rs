//! Appointment models and the appointment status machine.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::procedure::{Procedure, ProcedureListing};
use super::record::ClinicalRecord;

/// Appointment status.
///
/// ```text
/// PENDING ──► CONFIRMED ──► DONE
///    │  └──────────┼────────►▲
///    └──────► CANCELLED ◄────┘ (from CONFIRMED)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    /// Requested by the patient, awaiting the clinic
    Pending,
    /// Accepted by the clinic
    Confirmed,
    /// Attended (terminal)
    Done,
    /// Called off (terminal)
    Cancelled,
}

/// Outcome of consulting the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Allow,
    Deny(&'static str),
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Done,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Done => "DONE",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Done | AppointmentStatus::Cancelled)
    }

    /// The complete transition table, `self` being the current status.
    pub fn transition_to(self, requested: AppointmentStatus) -> Transition {
        use AppointmentStatus::*;

        match (self, requested) {
            (_, Pending) => Transition::Deny("an appointment cannot return to pending"),
            (Pending, Confirmed) | (Pending, Done) | (Pending, Cancelled) => Transition::Allow,
            (Confirmed, Done) | (Confirmed, Cancelled) => Transition::Allow,
            (Confirmed, Confirmed) => Transition::Deny("appointment is already confirmed"),
            (Done, Cancelled) => Transition::Deny("cannot cancel a completed appointment"),
            (Done, _) => Transition::Deny("appointment is already completed"),
            (Cancelled, _) => Transition::Deny("appointment has been cancelled"),
        }
    }

    /// Statuses reachable in one step.
    pub fn allowed_transitions(self) -> Vec<AppointmentStatus> {
        Self::ALL
            .into_iter()
            .filter(|next| self.transition_to(*next) == Transition::Allow)
            .collect()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "DONE" => Ok(AppointmentStatus::Done),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// Sum of procedure prices; zero for an empty set.
pub fn total_price<'a>(procedures: impl IntoIterator<Item = &'a Procedure>) -> Decimal {
    procedures
        .into_iter()
        .map(|p| p.price)
        .fold(Decimal::ZERO, |acc, price| acc + price)
}

/// A booking of one patient at one clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub clinic_id: String,
    /// Linked procedures, in booking order
    pub procedure_ids: Vec<String>,
    pub scheduled_at: NaiveDateTime,
    /// Always the sum of the linked procedures' prices
    pub total_price: Decimal,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Appointment {
    /// Create a pending appointment for the given procedures.
    pub fn new(
        patient_id: String,
        clinic_id: String,
        procedures: &[Procedure],
        scheduled_at: NaiveDateTime,
        notes: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let mut appointment = Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            clinic_id,
            procedure_ids: Vec::new(),
            scheduled_at,
            total_price: Decimal::ZERO,
            status: AppointmentStatus::Pending,
            notes,
            created_at: now.clone(),
            updated_at: now,
        };
        appointment.set_procedures(procedures);
        appointment
    }

    /// Replace the procedure set and recompute the total.
    pub fn set_procedures(&mut self, procedures: &[Procedure]) {
        self.procedure_ids = procedures.iter().map(|p| p.id.clone()).collect();
        self.total_price = total_price(procedures);
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// Booking request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[validate(length(min = 1, message = "clinic id is required"))]
    pub clinic_id: String,
    #[validate(length(min = 1, message = "select at least one procedure"))]
    pub procedure_ids: Vec<String>,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Appointment enriched for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub clinic_id: String,
    pub clinic_name: String,
    pub procedures: Vec<ProcedureListing>,
    pub scheduled_at: NaiveDateTime,
    pub total_price: Decimal,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub record: Option<ClinicalRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    fn procedure(price: Decimal) -> Procedure {
        Procedure {
            id: uuid::Uuid::new_v4().to_string(),
            clinic_id: "c1".into(),
            name: "Consulta".into(),
            description: None,
            price,
            duration_minutes: 30,
            available: true,
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(Pending.allowed_transitions(), vec![Confirmed, Done, Cancelled]);
        assert_eq!(Confirmed.allowed_transitions(), vec![Done, Cancelled]);
        assert!(Done.allowed_transitions().is_empty());
        assert!(Cancelled.allowed_transitions().is_empty());
    }

    #[test]
    fn test_cancel_completed_denied_with_reason() {
        assert_eq!(
            Done.transition_to(Cancelled),
            Transition::Deny("cannot cancel a completed appointment")
        );
    }

    #[test]
    fn test_nothing_returns_to_pending() {
        for status in AppointmentStatus::ALL {
            assert!(matches!(status.transition_to(Pending), Transition::Deny(_)));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(Done.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Confirmed.is_terminal());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("CONFIRMED".parse::<AppointmentStatus>().unwrap(), Confirmed);
        assert!("REALIZADO".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_new_appointment_totals_procedures() {
        let procedures = vec![procedure(Decimal::new(15000, 2)), procedure(Decimal::new(2050, 2))];
        let appointment = Appointment::new(
            "p1".into(),
            "c1".into(),
            &procedures,
            at("2030-01-10T09:30:00"),
            None,
        );
        assert_eq!(appointment.total_price, Decimal::new(17050, 2));
        assert_eq!(appointment.status, Pending);
        assert_eq!(appointment.procedure_ids.len(), 2);
    }

    #[test]
    fn test_set_procedures_recomputes_total() {
        let mut appointment = Appointment::new(
            "p1".into(),
            "c1".into(),
            &[procedure(Decimal::new(100, 0))],
            at("2030-01-10T09:30:00"),
            None,
        );
        appointment.set_procedures(&[]);
        assert_eq!(appointment.total_price, Decimal::ZERO);
        assert!(appointment.procedure_ids.is_empty());
    }

    #[test]
    fn test_new_appointment_requires_procedures() {
        let request = NewAppointment {
            clinic_id: "c1".into(),
            procedure_ids: vec![],
            scheduled_at: at("2030-01-10T09:30:00"),
            notes: None,
        };
        assert!(request.validate().is_err());
    }
}
