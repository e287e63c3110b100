//! # Booking Repository
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── insert_booking() → Booking { status: Booked }                   │
//! │                                                                         │
//! │  2. ADD SERVICES (any number of times while Booked)                     │
//! │                                                                         │
//! │  3. CHECKOUT                                                            │
//! │     └── mark_completed() → Booking { status: Completed }                │
//! │         guarded: WHERE status = 'booked', so a second checkout          │
//! │         changes no row and is reported as already completed            │
//! │                                                                         │
//! │  Bookings are never deleted.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use venue_core::availability::BookingWindow;
use venue_core::{Booking, BookingStatus};

const BOOKING_COLUMNS: &str =
    "id, customer_id, room_id, booking_date, start_time, end_time, guest_count, status";

/// Repository for booking reads.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Booking>> {
        fetch_booking(&self.pool, id).await
    }

    /// Active (Booked) bookings of every room on `date`.
    pub async fn active_on(&self, date: NaiveDate) -> DbResult<Vec<Booking>> {
        fetch_active_on(&self.pool, date).await
    }

    /// All bookings of a customer, newest date first.
    pub async fn for_customer(&self, customer_id: i64) -> DbResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1 \
             ORDER BY booking_date DESC, start_time DESC, id DESC"
        );
        let bookings = sqlx::query_as::<_, Booking>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }
}

// =============================================================================
// Executor-generic lookups & transactional writes
// =============================================================================

pub(crate) async fn fetch_booking<'e, E>(executor: E, id: i64) -> DbResult<Option<Booking>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    let booking = sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(booking)
}

pub(crate) async fn fetch_active_on<'e, E>(executor: E, date: NaiveDate) -> DbResult<Vec<Booking>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_date = ?1 AND status = ?2 \
         ORDER BY room_id, start_time"
    );
    let bookings = sqlx::query_as::<_, Booking>(&sql)
        .bind(date)
        .bind(BookingStatus::Booked)
        .fetch_all(executor)
        .await?;

    Ok(bookings)
}

/// Active bookings of one room on one date.
pub(crate) async fn fetch_active_for_room<'e, E>(executor: E, room_id: i64, date: NaiveDate) -> DbResult<Vec<Booking>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings \
         WHERE room_id = ?1 AND booking_date = ?2 AND status = ?3 \
         ORDER BY start_time"
    );
    let bookings = sqlx::query_as::<_, Booking>(&sql)
        .bind(room_id)
        .bind(date)
        .bind(BookingStatus::Booked)
        .fetch_all(executor)
        .await?;

    Ok(bookings)
}

/// Number of active bookings still holding a room, on any date.
pub(crate) async fn count_active_for_room(conn: &mut SqliteConnection, room_id: i64) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE room_id = ?1 AND status = ?2")
        .bind(room_id)
        .bind(BookingStatus::Booked)
        .fetch_one(conn)
        .await?;

    Ok(count)
}

/// Inserts a Booked booking.
pub(crate) async fn insert_booking(
    conn: &mut SqliteConnection,
    customer_id: i64,
    room_id: i64,
    window: &BookingWindow,
    guest_count: i64,
) -> DbResult<Booking> {
    debug!(
        room_id,
        customer_id,
        date = %window.date,
        start = %window.start,
        end = %window.end,
        "Inserting booking"
    );

    let sql = format!(
        r#"
        INSERT INTO bookings (
            customer_id, room_id, booking_date, start_time, end_time, guest_count, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING {BOOKING_COLUMNS}
        "#
    );
    let booking = sqlx::query_as::<_, Booking>(&sql)
        .bind(customer_id)
        .bind(room_id)
        .bind(window.date)
        .bind(window.start)
        .bind(window.end)
        .bind(guest_count)
        .bind(BookingStatus::Booked)
        .fetch_one(conn)
        .await?;

    Ok(booking)
}

/// Moves a booking from Booked to Completed.
///
/// Returns `false` when no Booked row matched: the booking is missing or was
/// already completed.
pub(crate) async fn mark_completed(conn: &mut SqliteConnection, booking_id: i64) -> DbResult<bool> {
    let result = sqlx::query("UPDATE bookings SET status = ?2 WHERE id = ?1 AND status = ?3")
        .bind(booking_id)
        .bind(BookingStatus::Completed)
        .bind(BookingStatus::Booked)
        .execute(conn)
        .await?;

    debug!(booking_id, rows = result.rows_affected(), "Marked booking completed");
    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
