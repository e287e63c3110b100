//! # Revenue Reporting
//!
//! Revenue is summed per room type over a half-open date range. The
//! grouping itself runs in SQL; this module owns the range rules and the
//! row shape.
//!
//! ```text
//! ReportPeriod [2024-01-01, 2024-02-01)
//!
//!   2024-01-01 00:00 ── included
//!   2024-01-31 23:59 ── included
//!   2024-02-01 00:00 ── excluded (end is exclusive)
//! ```

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::validate_date_range;

/// A `[start, end)` reporting range in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportPeriod {
    /// Creates a period. `end == start` is an empty period; `end < start`
    /// is rejected.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        validate_date_range(start, end)?;
        Ok(ReportPeriod { start, end })
    }

    /// Midnight at the start date (inclusive bound).
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Midnight at the end date (exclusive bound).
    pub fn ends_before(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Revenue of one room type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RevenueRow {
    pub room_type_name: String,
    pub total_revenue: Money,
    pub booking_count: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
