//! # Service Order Repository
//!
//! One row per (booking, service). Attaching the same service again adds to
//! the stored quantity inside a single statement:
//!
//! ```text
//! INSERT ... VALUES (booking, service, 2)   → quantity 2
//! INSERT ... VALUES (booking, service, 3)
//!   ON CONFLICT DO UPDATE quantity + 3      → quantity 5
//! ```

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use venue_core::{ServiceLine, ServiceOrder};

/// Repository for service order reads.
#[derive(Debug, Clone)]
pub struct ServiceOrderRepository {
    pool: SqlitePool,
}

impl ServiceOrderRepository {
    /// Creates a new ServiceOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ServiceOrderRepository { pool }
    }

    /// Gets the order of one service on one booking.
    pub async fn get(&self, booking_id: i64, service_id: i64) -> DbResult<Option<ServiceOrder>> {
        fetch_order(&self.pool, booking_id, service_id).await
    }

    /// Service orders of a booking joined with their services.
    pub async fn lines_for_booking(&self, booking_id: i64) -> DbResult<Vec<ServiceLine>> {
        fetch_lines(&self.pool, booking_id).await
    }
}

pub(crate) async fn fetch_order<'e, E>(executor: E, booking_id: i64, service_id: i64) -> DbResult<Option<ServiceOrder>>
where
    E: SqliteExecutor<'e>,
{
    let order = sqlx::query_as::<_, ServiceOrder>(
        "SELECT booking_id, service_id, quantity FROM service_orders \
         WHERE booking_id = ?1 AND service_id = ?2",
    )
    .bind(booking_id)
    .bind(service_id)
    .fetch_optional(executor)
    .await?;

    Ok(order)
}

pub(crate) async fn fetch_lines<'e, E>(executor: E, booking_id: i64) -> DbResult<Vec<ServiceLine>>
where
    E: SqliteExecutor<'e>,
{
    let lines = sqlx::query_as::<_, ServiceLine>(
        r#"
        SELECT
            s.id AS service_id,
            s.name AS service_name,
            s.price AS unit_price,
            o.quantity
        FROM service_orders o
        INNER JOIN services s ON s.id = o.service_id
        WHERE o.booking_id = ?1
        ORDER BY s.id
        "#,
    )
    .bind(booking_id)
    .fetch_all(executor)
    .await?;

    Ok(lines)
}

/// Adds `quantity` to the (booking, service) order, creating it if absent.
///
/// Returns the order with its accumulated quantity.
pub(crate) async fn add_quantity(
    conn: &mut SqliteConnection,
    booking_id: i64,
    service_id: i64,
    quantity: i64,
) -> DbResult<ServiceOrder> {
    debug!(booking_id, service_id, quantity, "Adding service quantity");

    let order = sqlx::query_as::<_, ServiceOrder>(
        r#"
        INSERT INTO service_orders (booking_id, service_id, quantity)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(booking_id, service_id)
        DO UPDATE SET quantity = quantity + excluded.quantity
        RETURNING booking_id, service_id, quantity
        "#,
    )
    .bind(booking_id)
    .bind(service_id)
    .bind(quantity)
    .fetch_one(conn)
    .await?;

    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================
