//! # Validation Module
//!
//! Input validation for engine operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation layer                                            │
//! │  ├── Form parsing (dates, times, numbers)                               │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: BookingEngine (Rust)                                          │
//! │  └── THIS MODULE: ranges, ordering, required fields                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints (phone, card code, invoice per booking)         │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure here surfaces to the caller as `InvalidArgument`.

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;
use crate::{MAX_ACTUAL_HOURS, MAX_SERVICE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_CUSTOMER_NAME_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 15;
const MAX_CARD_CODE_LEN: usize = 20;
const MAX_ROOM_QUERY_LEN: usize = 150;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name: non-blank, at most 100 characters.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be blank
/// - At most 15 characters
/// - Digits, with an optional leading `+`
///
/// ## Example
/// ```rust
/// use venue_core::validation::validate_phone;
///
/// assert!(validate_phone("0901234567").is_ok());
/// assert!(validate_phone("+84901234567").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, optionally prefixed with '+'".to_string(),
        });
    }

    Ok(())
}

/// Validates a membership card code: non-blank, at most 20 characters.
pub fn validate_card_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "card_code".to_string(),
        });
    }

    if code.len() > MAX_CARD_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "card_code".to_string(),
            max: MAX_CARD_CODE_LEN,
        });
    }

    Ok(())
}

/// Validates a room-name search term and returns it trimmed.
///
/// An empty term is allowed and means "no name filter".
pub fn validate_room_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_ROOM_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_ROOM_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a guest count is positive.
///
/// The upper bound depends on the room type and is checked by
/// [`crate::availability::ensure_bookable`] as `CapacityExceeded`.
pub fn validate_guest_count(guests: i64) -> ValidationResult<()> {
    if guests <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "guest_count".to_string(),
        });
    }

    Ok(())
}

/// Validates a service quantity: positive and at most
/// [`MAX_SERVICE_QUANTITY`].
///
/// Callers also run it on the accumulated quantity of an order.
///
/// ## User Workflow
/// ```text
/// Staff picks "Tiger" × 0
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      └── Error: "quantity must be positive" (nothing is written)
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_SERVICE_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: MAX_SERVICE_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates billed hours: finite, strictly positive, at most
/// [`MAX_ACTUAL_HOURS`].
pub fn validate_actual_hours(hours: f64) -> ValidationResult<()> {
    if !hours.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "actual_hours".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if hours <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "actual_hours".to_string(),
        });
    }

    if hours > MAX_ACTUAL_HOURS {
        return Err(ValidationError::TooLarge {
            field: "actual_hours".to_string(),
            max: MAX_ACTUAL_HOURS.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Time Validators
// =============================================================================

/// Validates a booking window: `end` strictly after `start` on the same day.
pub fn validate_window(start: NaiveTime, end: NaiveTime) -> ValidationResult<()> {
    if end <= start {
        return Err(ValidationError::EmptyWindow { start, end });
    }

    Ok(())
}

/// Validates a report range: `end` not before `start`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if end < start {
        return Err(ValidationError::InvertedRange { start, end });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
