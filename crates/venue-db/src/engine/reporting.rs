//! Revenue reporting.

use chrono::NaiveDate;
use tracing::debug;

use super::BookingEngine;
use crate::error::EngineResult;
use venue_core::report::{ReportPeriod, RevenueRow};

impl BookingEngine {
    /// Invoice revenue per room type for payments in
    /// `[start_date 00:00, end_date 00:00)`, ordered by room type name.
    ///
    /// Room types without invoices in the range are omitted, and
    /// `end_date == start_date` gives an empty report.
    ///
    /// ## Errors
    /// `InvalidArgument` when `end_date` is before `start_date`.
    pub async fn revenue_by_room_type(&self, start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Vec<RevenueRow>> {
        let period = ReportPeriod::new(start_date, end_date)?;
        if period.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.db.invoices().revenue_by_room_type(&period).await?;

        debug!(
            start = %start_date,
            end = %end_date,
            room_types = rows.len(),
            "Revenue report built"
        );
        Ok(rows)
    }
}
