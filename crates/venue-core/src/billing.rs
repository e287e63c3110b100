//! # Billing
//!
//! Invoice computation at checkout.
//!
//! ## Computation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. room_cost    = hourly rate × actual hours (rounded once)            │
//! │  2. service_cost = Σ quantity × unit price                              │
//! │  3. discount     = 5% iff member AND visits this month ≥ 10, else 0     │
//! │  4. gross        = room_cost + service_cost                             │
//! │     subtotal     = gross × (1 − discount)                               │
//! │     vat          = subtotal × 10%                                       │
//! │     total        = subtotal + vat                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Visits this month" counts membership history already on record. The
//! checkout being billed writes its own history row afterwards, so it never
//! counts toward its own discount.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ServiceLine, TaxRate};
use crate::validation::validate_actual_hours;
use crate::{DEFAULT_LOYALTY_DISCOUNT_BPS, DEFAULT_LOYALTY_VISIT_THRESHOLD};

// =============================================================================
// Policy
// =============================================================================

/// Venue-wide billing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillingPolicy {
    /// VAT applied to the discounted subtotal.
    pub vat_rate: TaxRate,
    /// Discount granted to frequent members, in basis points.
    pub loyalty_discount_bps: u32,
    /// Recorded visits in the current month needed for the discount.
    pub loyalty_visit_threshold: i64,
}

impl Default for BillingPolicy {
    /// 10% VAT, 5% loyalty discount from the 10th recorded visit of the month.
    fn default() -> Self {
        BillingPolicy {
            vat_rate: TaxRate::default(),
            loyalty_discount_bps: DEFAULT_LOYALTY_DISCOUNT_BPS,
            loyalty_visit_threshold: DEFAULT_LOYALTY_VISIT_THRESHOLD,
        }
    }
}

// =============================================================================
// Input / Output
// =============================================================================

/// Everything the invoice depends on, gathered by the caller.
#[derive(Debug, Clone)]
pub struct BillingInput<'a> {
    /// Room type price per hour.
    pub hourly_rate: Money,
    /// Hours actually used, as entered at checkout.
    pub actual_hours: f64,
    /// Service orders of the booking.
    pub service_lines: &'a [ServiceLine],
    /// Whether the customer holds a membership card.
    pub is_member: bool,
    /// Membership history rows recorded this calendar month.
    pub visits_this_month: i64,
}

/// The computed amounts of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceBreakdown {
    pub room_cost: Money,
    pub service_cost: Money,
    /// room cost + service cost, before discount.
    pub gross: Money,
    pub discount_bps: u32,
    pub sub_total: Money,
    pub vat: Money,
    pub total: Money,
}

// =============================================================================
// Rules
// =============================================================================

fn overflow(field: &str) -> CoreError {
    ValidationError::AmountOverflow {
        field: field.to_string(),
    }
    .into()
}

/// Σ quantity × unit price over the booking's service lines.
///
/// ## Errors
/// `InvalidArgument` when a line or the sum does not fit in i64.
pub fn service_cost(lines: &[ServiceLine]) -> CoreResult<Money> {
    let totals = lines
        .iter()
        .map(ServiceLine::line_total)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| overflow("service_cost"))?;

    Money::checked_sum(totals).ok_or_else(|| overflow("service_cost"))
}

/// Loyalty discount in basis points for a customer.
///
/// ## Example
/// ```rust
/// use venue_core::billing::{loyalty_discount_bps, BillingPolicy};
///
/// let policy = BillingPolicy::default();
/// assert_eq!(loyalty_discount_bps(true, 10, &policy), 500);
/// assert_eq!(loyalty_discount_bps(true, 9, &policy), 0);
/// assert_eq!(loyalty_discount_bps(false, 30, &policy), 0);
/// ```
pub fn loyalty_discount_bps(is_member: bool, visits_this_month: i64, policy: &BillingPolicy) -> u32 {
    if is_member && visits_this_month >= policy.loyalty_visit_threshold {
        policy.loyalty_discount_bps
    } else {
        0
    }
}

/// Computes the invoice amounts.
///
/// ## Errors
/// `InvalidArgument` when `actual_hours` is not a finite number in
/// `(0, MAX_ACTUAL_HOURS]`, or when any amount does not fit in i64.
pub fn compute_invoice(input: &BillingInput<'_>, policy: &BillingPolicy) -> CoreResult<InvoiceBreakdown> {
    validate_actual_hours(input.actual_hours)?;

    let room_cost = input
        .hourly_rate
        .checked_multiply_hours(input.actual_hours)
        .ok_or_else(|| overflow("room_cost"))?;
    let service_cost = service_cost(input.service_lines)?;
    let discount_bps = loyalty_discount_bps(input.is_member, input.visits_this_month, policy);

    let gross = room_cost.checked_add(service_cost).ok_or_else(|| overflow("gross"))?;
    let sub_total = gross
        .apply_percentage_discount(discount_bps)
        .ok_or_else(|| overflow("sub_total"))?;
    let vat = sub_total.calculate_tax(policy.vat_rate).ok_or_else(|| overflow("vat"))?;
    let total = sub_total.checked_add(vat).ok_or_else(|| overflow("total"))?;

    Ok(InvoiceBreakdown {
        room_cost,
        service_cost,
        gross,
        discount_bps,
        sub_total,
        vat,
        total,
    })
}

/// `YYYY-MM` key of the calendar month containing `date`.
///
/// Membership visits are counted per key, matching history rows whose
/// `usage_date` falls in the same month and year.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// =============================================================================
// Unit Tests
// =============================================================================
