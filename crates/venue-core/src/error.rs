//! # Error Types
//!
//! Domain-specific error types for venue-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  venue-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── ErrorKind        - Caller-facing classification                    │
//! │                                                                         │
//! │  venue-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── EngineError      - CoreError | DbError, what callers receive       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → presentation layer   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (IDs, requested vs. allowed)
//! 3. Errors are enum variants, never String
//! 4. Every variant maps to exactly one [`ErrorKind`]

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A room, booking, service or customer reference does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The requested window conflicts with an active booking of the room.
    ///
    /// ## User Workflow
    /// ```text
    /// Book "VIP 01" 2024-03-08 19:00-22:00
    ///      │
    ///      ▼
    /// Existing booking #41 on 2024-03-08 20:00-23:00 (Booked)
    ///      │
    ///      ▼
    /// RoomUnavailable { room_id, date, start, end }
    ///      │
    ///      ▼
    /// Caller offers another room or another time
    /// ```
    #[error("Room {room_id} is not available on {date} from {start} to {end}")]
    RoomUnavailable {
        room_id: i64,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },

    /// Guest count is over the room type capacity or the venue-wide ceiling.
    #[error("Guest count {requested} exceeds the allowed maximum of {allowed}")]
    CapacityExceeded { requested: i64, allowed: i64 },

    /// The booking is already checked out (terminal state).
    #[error("Booking {0} is already completed")]
    BookingAlreadyCompleted(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::RoomUnavailable { .. } => ErrorKind::RoomUnavailable,
            CoreError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            CoreError::BookingAlreadyCompleted(_) => ErrorKind::BookingAlreadyCompleted,
            CoreError::Validation(_) => ErrorKind::InvalidArgument,
        }
    }
}

// =============================================================================
// Error Kind
// =============================================================================

/// Caller-facing outcome classes.
///
/// ## Usage in a presentation layer
/// ```text
/// InvalidArgument         → 400, re-show the form
/// NotFound                → 404
/// RoomUnavailable         → 409, suggest another room
/// CapacityExceeded        → 422
/// BookingAlreadyCompleted → 409
/// Storage                 → 500
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    InvalidArgument,
    /// Reference does not resolve.
    NotFound,
    /// Window conflicts with an active booking.
    RoomUnavailable,
    /// Guest count over the limit.
    CapacityExceeded,
    /// Operation attempted on a terminal booking.
    BookingAlreadyCompleted,
    /// The persistence layer failed.
    Storage,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value exceeds its allowed maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// A computed amount does not fit in i64 minor units.
    #[error("{field} is too large to represent")]
    AmountOverflow { field: String },

    /// Invalid format (e.g., phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A time window whose end is not after its start.
    #[error("end time {end} must be after start time {start}")]
    EmptyWindow { start: NaiveTime, end: NaiveTime },

    /// A date range whose end precedes its start.
    #[error("end date {end} must not be before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// Duplicate value (e.g., membership card already issued).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
