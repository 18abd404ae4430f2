//! Report read models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Revenue of one clinic over a closed date-time window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub clinic_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Completed appointments inside the window
    pub appointment_count: u64,
    pub total_revenue: Decimal,
}
