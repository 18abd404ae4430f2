//! Revenue reporting.

use chrono::{Duration, NaiveDateTime, SubsecRound, Timelike};
use rust_decimal::Decimal;
use tracing::debug;

use super::{require_clinic_manager, ServiceError, ServiceResult};
use crate::db::Database;
use crate::models::{Principal, RevenueReport};

pub struct ReportService<'a> {
    db: &'a Database,
}

impl<'a> ReportService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Sum of completed appointments of a clinic scheduled within `[start, end]`.
    pub fn revenue(
        &self,
        principal: &Principal,
        clinic_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> ServiceResult<RevenueReport> {
        require_clinic_manager(principal, clinic_id)?;
        if start > end {
            return Err(ServiceError::Validation("start: must not be after end".into()));
        }
        let clinic = self
            .db
            .get_clinic(clinic_id)?
            .ok_or_else(|| ServiceError::not_found("clinic", clinic_id))?;

        // appointment times are whole seconds; narrow the window onto them
        let from = if start.nanosecond() == 0 {
            start
        } else {
            start.trunc_subsecs(0) + Duration::seconds(1)
        };
        let to = end.trunc_subsecs(0);
        let rows = self.db.completed_appointments_between(&clinic.id, &from, &to)?;
        let total_revenue = rows
            .iter()
            .fold(Decimal::ZERO, |acc, row| acc + row.total_price);
        debug!(clinic_id, appointments = rows.len(), %total_revenue, "Revenue computed");

        Ok(RevenueReport {
            clinic_id: clinic.id,
            start,
            end,
            appointment_count: rows.len() as u64,
            total_revenue,
        })
    }
}
