//! # Availability Rules
//!
//! Decides which rooms can take a booking for a given window and party size.
//!
//! ## Overlap Test
//! ```text
//! Two windows on the same date overlap iff
//!
//!     start_a < end_b  AND  end_a > start_b
//!
//!   18:00 ────────── 20:00
//!                    20:00 ────────── 22:00     touching → no overlap
//!         19:00 ──────────── 21:00              overlap
//! ```
//!
//! Only active (non-Completed) bookings block a room. A room's `status`
//! column is informational and never consulted here.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{AvailabilityQuery, Booking, Room, RoomType};
use crate::validation::{validate_guest_count, validate_window};

// =============================================================================
// Booking Window
// =============================================================================

/// A half-open `[start, end)` interval on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl BookingWindow {
    /// Creates a validated window (`end` strictly after `start`).
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> CoreResult<Self> {
        validate_window(start, end)?;
        Ok(BookingWindow { date, start, end })
    }

    /// Builds a window from stored columns without re-validating.
    pub(crate) fn from_parts(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        BookingWindow { date, start, end }
    }

    /// True when both windows share a date and their intervals intersect.
    #[inline]
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.date == other.date && self.start < other.end && self.end > other.start
    }

    /// Booked duration in hours.
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }
}

impl AvailabilityQuery {
    /// Validates the query and returns its window.
    pub fn window(&self) -> CoreResult<BookingWindow> {
        validate_guest_count(self.guest_count)?;
        BookingWindow::new(self.date, self.start_time, self.end_time)
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Returns the first active booking that collides with `window`.
pub fn find_conflict<'a, I>(window: &BookingWindow, bookings: I) -> Option<&'a Booking>
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings
        .into_iter()
        .find(|b| b.is_active() && b.window().overlaps(window))
}

/// Filters `rooms` down to those that can host the query.
///
/// A room qualifies when its type's capacity covers the guest count and none
/// of `bookings` (any rooms, any dates) is an active booking of that room
/// overlapping the window. Input order is preserved.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, NaiveTime};
/// use venue_core::availability::select_available;
/// use venue_core::{AvailabilityQuery, Room, RoomStatus, RoomType};
///
/// let types = vec![RoomType { id: 1, name: "Đôi".into(), capacity: 2, price: 100_000 }];
/// let rooms = vec![Room { id: 7, name: "Đôi 01".into(), room_type_id: 1, status: RoomStatus::Available }];
/// let query = AvailabilityQuery {
///     date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
///     start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
///     guest_count: 3,
/// };
///
/// // Three guests do not fit a two-seat room.
/// assert!(select_available(&query, &rooms, &types, &[]).unwrap().is_empty());
/// ```
pub fn select_available(
    query: &AvailabilityQuery,
    rooms: &[Room],
    room_types: &[RoomType],
    bookings: &[Booking],
) -> CoreResult<Vec<Room>> {
    let window = query.window()?;

    let capacities: HashMap<i64, i64> = room_types.iter().map(|t| (t.id, t.capacity)).collect();

    let busy: HashSet<i64> = bookings
        .iter()
        .filter(|b| b.is_active() && b.window().overlaps(&window))
        .map(|b| b.room_id)
        .collect();

    Ok(rooms
        .iter()
        .filter(|room| {
            capacities
                .get(&room.room_type_id)
                .is_some_and(|capacity| *capacity >= query.guest_count)
        })
        .filter(|room| !busy.contains(&room.id))
        .cloned()
        .collect())
}

/// Checks that `room` can take a booking of `guest_count` in `window`.
///
/// ## Order of Checks
/// 1. guest count positive        → `InvalidArgument`
/// 2. within capacity and ≤ 15    → `CapacityExceeded`
/// 3. no overlapping active booking → `RoomUnavailable`
pub fn ensure_bookable(
    room: &Room,
    room_type: &RoomType,
    window: &BookingWindow,
    guest_count: i64,
    existing: &[Booking],
) -> CoreResult<()> {
    validate_guest_count(guest_count)?;

    let allowed = room_type.guest_limit();
    if guest_count > allowed {
        return Err(CoreError::CapacityExceeded {
            requested: guest_count,
            allowed,
        });
    }

    let room_bookings = existing.iter().filter(|b| b.room_id == room.id);
    if find_conflict(window, room_bookings).is_some() {
        return Err(CoreError::RoomUnavailable {
            room_id: room.id,
            date: window.date,
            start: window.start,
            end: window.end,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
