//! # Invoice Repository
//!
//! Invoices are written once at checkout and never updated. The UNIQUE
//! constraint on `booking_id` backs the one-invoice-per-booking rule.

use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use venue_core::billing::InvoiceBreakdown;
use venue_core::report::{ReportPeriod, RevenueRow};
use venue_core::Invoice;

const INVOICE_COLUMNS: &str =
    "id, booking_id, payment_date, room_cost, service_cost, discount_bps, sub_total, vat, total_amount";

/// Repository for invoice reads and revenue queries.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets the invoice of a booking, if it was checked out.
    pub async fn get_by_booking(&self, booking_id: i64) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Invoice revenue per room type for payments within `period`.
    ///
    /// Room types without invoices in the period are absent. Rows are
    /// ordered by room type name (byte order).
    ///
    /// ## Query Path
    /// ```text
    /// invoices ──booking_id──► bookings ──room_id──► rooms ──room_type_id──► room_types
    ///          GROUP BY rt.name: SUM(total_amount), COUNT(*)
    /// ```
    pub async fn revenue_by_room_type(&self, period: &ReportPeriod) -> DbResult<Vec<RevenueRow>> {
        debug!(
            from = %period.starts_at(),
            until = %period.ends_before(),
            "Summing revenue by room type"
        );

        let rows = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT
                rt.name AS room_type_name,
                SUM(i.total_amount) AS total_revenue,
                COUNT(*) AS booking_count
            FROM invoices i
            INNER JOIN bookings b ON b.id = i.booking_id
            INNER JOIN rooms r ON r.id = b.room_id
            INNER JOIN room_types rt ON rt.id = r.room_type_id
            WHERE i.payment_date >= ?1
            AND i.payment_date < ?2
            GROUP BY rt.name
            ORDER BY rt.name
            "#,
        )
        .bind(period.starts_at())
        .bind(period.ends_before())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Writes the invoice of a booking.
pub(crate) async fn insert_invoice(
    conn: &mut SqliteConnection,
    booking_id: i64,
    payment_date: NaiveDateTime,
    amounts: &InvoiceBreakdown,
) -> DbResult<Invoice> {
    debug!(
        booking_id,
        total = %amounts.total,
        discount_bps = amounts.discount_bps,
        "Inserting invoice"
    );

    let sql = format!(
        r#"
        INSERT INTO invoices (
            booking_id, payment_date,
            room_cost, service_cost, discount_bps,
            sub_total, vat, total_amount
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING {INVOICE_COLUMNS}
        "#
    );
    let invoice = sqlx::query_as::<_, Invoice>(&sql)
        .bind(booking_id)
        .bind(payment_date)
        .bind(amounts.room_cost.minor())
        .bind(amounts.service_cost.minor())
        .bind(amounts.discount_bps)
        .bind(amounts.sub_total.minor())
        .bind(amounts.vat.minor())
        .bind(amounts.total.minor())
        .fetch_one(conn)
        .await?;

    Ok(invoice)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::booking::insert_booking;
    use crate::repository::customer::insert_customer;
    use chrono::{NaiveDate, NaiveTime};
    use venue_core::availability::BookingWindow;
    use venue_core::Money;

    fn amounts(total: i64) -> InvoiceBreakdown {
        InvoiceBreakdown {
            room_cost: Money::from_minor(total),
            service_cost: Money::zero(),
            gross: Money::from_minor(total),
            discount_bps: 0,
            sub_total: Money::from_minor(total),
            vat: Money::zero(),
            total: Money::from_minor(total),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_invoice_per_booking_and_revenue_window() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rt = db.catalog().insert_room_type("Phòng vip", 8, 300_000).await.unwrap();
        let room = db.catalog().insert_room("VIP 01", rt.id).await.unwrap();
        let window = BookingWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        )
        .unwrap();

        let mut w = db.begin_write().await.unwrap();
        let customer = insert_customer(w.conn(), "Hoa", "0904").await.unwrap();
        let inside = insert_booking(w.conn(), customer.id, room.id, &window, 2).await.unwrap();
        let boundary = insert_booking(w.conn(), customer.id, room.id, &window, 2).await.unwrap();

        let invoice = insert_invoice(w.conn(), inside.id, at(2024, 1, 31, 23, 59), &amounts(330_000))
            .await
            .unwrap();
        insert_invoice(w.conn(), boundary.id, at(2024, 2, 1, 0, 0), &amounts(110_000))
            .await
            .unwrap();

        let err = insert_invoice(w.conn(), inside.id, at(2024, 1, 31, 23, 59), &amounts(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        w.commit().await.unwrap();

        assert_eq!(invoice.total().minor(), 330_000);
        assert_eq!(invoice.payment_date, at(2024, 1, 31, 23, 59));
        assert_eq!(
            db.invoices().get_by_booking(inside.id).await.unwrap(),
            Some(invoice)
        );

        let january = ReportPeriod::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap();
        let rows = db.invoices().revenue_by_room_type(&january).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].room_type_name, "Phòng vip");
        assert_eq!(rows[0].total_revenue, Money::from_minor(330_000));
        assert_eq!(rows[0].booking_count, 1);
    }
}
