//! # venue-core: Pure Business Logic for the Venue Engine
//!
//! This crate holds every booking and billing rule as pure functions with
//! zero I/O dependencies. The database layer (`venue-db`) fetches rows,
//! hands them to these functions, and persists the outcome.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Venue Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation layer (not in this repo)              │   │
//! │  │    Room list ──► Booking form ──► Services ──► Checkout         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ BookingEngine calls                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              venue-db (BookingEngine + repositories)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ venue-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │availability│ │  billing  │  │   │
//! │  │   │  Room     │  │   Money   │  │  windows  │  │ discount  │  │   │
//! │  │   │  Booking  │  │  TaxRate  │  │  capacity │  │   VAT     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (RoomType, Room, Booking, Invoice, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`availability`] - Booking windows, overlap and capacity rules
//! - [`billing`] - Invoice computation (room cost, services, loyalty, VAT)
//! - [`report`] - Revenue aggregation by room type
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use venue_core::billing::{compute_invoice, BillingInput, BillingPolicy};
//! use venue_core::money::Money;
//!
//! let input = BillingInput {
//!     hourly_rate: Money::from_minor(100_000),
//!     actual_hours: 3.0,
//!     service_lines: &[],
//!     is_member: false,
//!     visits_this_month: 0,
//! };
//!
//! let invoice = compute_invoice(&input, &BillingPolicy::default()).unwrap();
//! assert_eq!(invoice.total.minor(), 330_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod billing;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Hard ceiling on guests per booking, regardless of room capacity.
pub const MAX_GUESTS_PER_BOOKING: i64 = 15;

/// Ceiling on the accumulated quantity of one service on one booking.
pub const MAX_SERVICE_QUANTITY: i64 = 10_000;

/// Ceiling on the hours billed at checkout. A booking never spans more than
/// one calendar day.
pub const MAX_ACTUAL_HOURS: f64 = 24.0;

/// Default VAT applied to the discounted subtotal (1000 bps = 10%).
pub const DEFAULT_VAT_BPS: u32 = 1000;

/// Default loyalty discount for frequent members (500 bps = 5%).
pub const DEFAULT_LOYALTY_DISCOUNT_BPS: u32 = 500;

/// Recorded visits in the current calendar month needed for the loyalty discount.
pub const DEFAULT_LOYALTY_VISIT_THRESHOLD: i64 = 10;
