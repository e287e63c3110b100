//! # Domain Types
//!
//! Core domain types used throughout the venue engine.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  RoomType 1──* Room 1──* Booking *──1 Customer 1──* MembershipHistory   │
//! │                            │  │                                         │
//! │                            │  └──0..1 Invoice                           │
//! │                            │                                            │
//! │                            └──* ServiceOrder *──1 Service *──1 Category │
//! │                                                                         │
//! │  Every relation is an explicit foreign-key field (`room_type_id`,       │
//! │  `room_id`, ...). There are no back-pointers; related rows are read     │
//! │  through repository lookups.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money Columns
//! Persisted amounts are plain `i64` minor units (what the database stores);
//! each entity exposes a [`Money`] accessor for arithmetic.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::availability::BookingWindow;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the venue's VAT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_VAT_BPS)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A category of room defining capacity and hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RoomType {
    pub id: i64,
    /// Unique display name ("Phòng vip").
    pub name: String,
    /// Maximum number of guests.
    pub capacity: i64,
    /// Price per hour in minor units.
    pub price: i64,
}

impl RoomType {
    /// Returns the hourly price as Money.
    #[inline]
    pub fn hourly_price(&self) -> Money {
        Money::from_minor(self.price)
    }

    /// Effective guest limit: the capacity, capped by the venue-wide ceiling.
    #[inline]
    pub fn guest_limit(&self) -> i64 {
        self.capacity.min(crate::MAX_GUESTS_PER_BOOKING)
    }
}

/// Occupancy flag of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Available
    }
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Room {
    pub id: i64,
    /// Unique display name ("VIP 01").
    pub name: String,
    pub room_type_id: i64,
    pub status: RoomStatus,
}

/// Filter for listing rooms. Empty filter lists every room.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomFilter {
    /// Substring of the room name, ASCII case-insensitive.
    pub name_contains: Option<String>,
    pub room_type_id: Option<i64>,
}

/// Grouping for services ("Food", "Drink").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ServiceCategory {
    pub id: i64,
    pub name: String,
}

/// An orderable ancillary service (snack, drink, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Service {
    pub id: i64,
    pub name: String,
    /// Unit price in minor units.
    pub price: i64,
    pub category_id: i64,
}

impl Service {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A guest, identified by phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Unique identity key.
    pub phone: String,
    /// Membership card; presence enables the loyalty discount.
    pub card_code: Option<String>,
}

impl Customer {
    /// True when the customer holds a membership card.
    #[inline]
    pub fn is_member(&self) -> bool {
        self.card_code.is_some()
    }
}

// =============================================================================
// Booking
// =============================================================================

/// Lifecycle state of a booking. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Reserved, not yet checked out.
    Booked,
    /// Checked out and invoiced.
    Completed,
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Booked
    }
}

/// A reservation of one room for one window on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub room_id: i64,
    #[ts(as = "String")]
    pub booking_date: NaiveDate,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub guest_count: i64,
    pub status: BookingStatus,
}

impl Booking {
    /// The `[start, end)` window this booking occupies.
    #[inline]
    pub fn window(&self) -> BookingWindow {
        BookingWindow::from_parts(self.booking_date, self.start_time, self.end_time)
    }

    /// True while the booking still holds its room.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Completed
    }
}

/// Request to create a booking.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewBooking {
    pub customer_name: String,
    pub phone: String,
    pub room_id: i64,
    #[ts(as = "String")]
    pub booking_date: NaiveDate,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub guest_count: i64,
}

/// Request to search for free rooms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvailabilityQuery {
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub start_time: NaiveTime,
    #[ts(as = "String")]
    pub end_time: NaiveTime,
    pub guest_count: i64,
}

// =============================================================================
// Service Orders
// =============================================================================

/// Quantity of one service attached to one booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ServiceOrder {
    pub booking_id: i64,
    pub service_id: i64,
    pub quantity: i64,
}

/// A service order joined with its service, as billed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ServiceLine {
    pub service_id: i64,
    pub service_name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

impl ServiceLine {
    /// unit price × quantity, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        Money::from_minor(self.unit_price).checked_mul(self.quantity)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// The bill issued at checkout. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: i64,
    /// Unique: a booking has at most one invoice.
    pub booking_id: i64,
    #[ts(as = "String")]
    pub payment_date: NaiveDateTime,
    pub room_cost: i64,
    pub service_cost: i64,
    /// Applied discount in basis points (500 = 5%).
    pub discount_bps: u32,
    pub sub_total: i64,
    pub vat: i64,
    pub total_amount: i64,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount)
    }
}

// =============================================================================
// Membership History
// =============================================================================

/// One visit of a carded customer. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MembershipHistory {
    pub id: i64,
    pub customer_id: i64,
    pub booking_id: Option<i64>,
    #[ts(as = "String")]
    pub usage_date: NaiveDate,
    /// Always 1: a counting unit, not a running total.
    pub visit_count: i64,
    pub applied_discount_bps: u32,
}

// =============================================================================
// Users
// =============================================================================

/// Staff account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Staff,
    Admin,
}

/// A staff account. The engine only stores and returns it; credential
/// checks belong to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
}

// =============================================================================
// Unit Tests
// =============================================================================
