//! # Membership History Repository
//!
//! Append-only log of visits by carded customers. The loyalty discount reads
//! how many rows a customer already has in the current calendar month.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use venue_core::billing::month_key;
use venue_core::MembershipHistory;

/// Repository for membership history reads.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    /// Creates a new MembershipRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MembershipRepository { pool }
    }

    /// History of a customer, oldest first.
    pub async fn history_for_customer(&self, customer_id: i64) -> DbResult<Vec<MembershipHistory>> {
        let history = sqlx::query_as::<_, MembershipHistory>(
            r#"
            SELECT id, customer_id, booking_id, usage_date, visit_count, applied_discount_bps
            FROM membership_histories
            WHERE customer_id = ?1
            ORDER BY usage_date, id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// Visits recorded in the calendar month containing `date`.
    pub async fn visits_in_month(&self, customer_id: i64, date: NaiveDate) -> DbResult<i64> {
        count_visits_in_month(&self.pool, customer_id, date).await
    }
}

pub(crate) async fn count_visits_in_month<'e, E>(executor: E, customer_id: i64, date: NaiveDate) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM membership_histories \
         WHERE customer_id = ?1 AND strftime('%Y-%m', usage_date) = ?2",
    )
    .bind(customer_id)
    .bind(month_key(date))
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Appends one visit.
pub(crate) async fn insert_history(
    conn: &mut SqliteConnection,
    customer_id: i64,
    booking_id: Option<i64>,
    usage_date: NaiveDate,
    applied_discount_bps: u32,
) -> DbResult<MembershipHistory> {
    debug!(customer_id, booking_id = ?booking_id, usage_date = %usage_date, "Recording membership visit");

    let history = sqlx::query_as::<_, MembershipHistory>(
        r#"
        INSERT INTO membership_histories (
            customer_id, booking_id, usage_date, visit_count, applied_discount_bps
        ) VALUES (?1, ?2, ?3, 1, ?4)
        RETURNING id, customer_id, booking_id, usage_date, visit_count, applied_discount_bps
        "#,
    )
    .bind(customer_id)
    .bind(booking_id)
    .bind(usage_date)
    .bind(applied_discount_bps)
    .fetch_one(conn)
    .await?;

    Ok(history)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::insert_customer;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_visits_counted_per_calendar_month() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut w = db.begin_write().await.unwrap();
        let customer = insert_customer(w.conn(), "Tuấn", "0905").await.unwrap();
        insert_history(w.conn(), customer.id, None, d(2024, 1, 31), 0).await.unwrap();
        insert_history(w.conn(), customer.id, None, d(2024, 2, 1), 0).await.unwrap();
        insert_history(w.conn(), customer.id, None, d(2024, 2, 29), 500).await.unwrap();
        // Same month, different year
        insert_history(w.conn(), customer.id, None, d(2023, 2, 10), 0).await.unwrap();
        w.commit().await.unwrap();

        let repo = db.memberships();
        assert_eq!(repo.visits_in_month(customer.id, d(2024, 2, 15)).await.unwrap(), 2);
        assert_eq!(repo.visits_in_month(customer.id, d(2024, 1, 1)).await.unwrap(), 1);
        assert_eq!(repo.visits_in_month(customer.id, d(2024, 3, 1)).await.unwrap(), 0);
        assert_eq!(repo.visits_in_month(customer.id + 1, d(2024, 2, 1)).await.unwrap(), 0);

        let history = repo.history_for_customer(customer.id).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].usage_date, d(2023, 2, 10));
        assert!(history.iter().all(|h| h.visit_count == 1));
        assert_eq!(history[3].applied_discount_bps, 500);
    }
}
