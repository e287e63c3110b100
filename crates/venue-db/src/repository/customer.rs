//! # Customer Repository
//!
//! Customers are keyed by phone number. They are created lazily by the first
//! booking made under a phone and never deleted.

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use venue_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, card_code";

/// Repository for customer reads.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        fetch_customer(&self.pool, id).await
    }

    /// Gets a customer by exact phone number.
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        fetch_customer_by_phone(&self.pool, phone).await
    }

    /// Gets the customer holding a membership card.
    pub async fn get_by_card_code(&self, card_code: &str) -> DbResult<Option<Customer>> {
        fetch_customer_by_card(&self.pool, card_code).await
    }
}

// =============================================================================
// Executor-generic lookups & transactional writes
// =============================================================================

pub(crate) async fn fetch_customer<'e, E>(executor: E, id: i64) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(customer)
}

pub(crate) async fn fetch_customer_by_phone<'e, E>(executor: E, phone: &str) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(phone)
        .fetch_optional(executor)
        .await?;

    Ok(customer)
}

pub(crate) async fn fetch_customer_by_card<'e, E>(executor: E, card_code: &str) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE card_code = ?1");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(card_code)
        .fetch_optional(executor)
        .await?;

    Ok(customer)
}

/// Inserts a customer without a membership card.
pub(crate) async fn insert_customer(conn: &mut SqliteConnection, name: &str, phone: &str) -> DbResult<Customer> {
    debug!(phone = %phone, "Creating customer");

    let sql = format!(
        "INSERT INTO customers (name, phone, card_code) VALUES (?1, ?2, NULL) \
         RETURNING {CUSTOMER_COLUMNS}"
    );
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(name)
        .bind(phone)
        .fetch_one(conn)
        .await?;

    Ok(customer)
}

/// Returns the customer with `phone`, creating it with `name` if absent.
///
/// An existing customer keeps its stored name.
pub(crate) async fn resolve_or_create(conn: &mut SqliteConnection, name: &str, phone: &str) -> DbResult<Customer> {
    if let Some(existing) = fetch_customer_by_phone(&mut *conn, phone).await? {
        return Ok(existing);
    }

    insert_customer(conn, name, phone).await
}

/// Sets (or replaces) a customer's membership card code.
pub(crate) async fn set_card_code(conn: &mut SqliteConnection, customer_id: i64, card_code: &str) -> DbResult<Customer> {
    debug!(customer_id, "Registering membership card");

    let sql = format!("UPDATE customers SET card_code = ?2 WHERE id = ?1 RETURNING {CUSTOMER_COLUMNS}");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(customer_id)
        .bind(card_code)
        .fetch_optional(conn)
        .await?;

    customer.ok_or_else(|| DbError::not_found("Customer", customer_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_resolve_or_create_keeps_existing_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut w = db.begin_write().await.unwrap();
        let first = resolve_or_create(w.conn(), "An", "0901000001").await.unwrap();
        let again = resolve_or_create(w.conn(), "Someone Else", "0901000001").await.unwrap();
        w.commit().await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.name, "An");
        assert!(!again.is_member());

        let by_phone = db.customers().get_by_phone("0901000001").await.unwrap();
        assert_eq!(by_phone, Some(first));
        assert!(db.customers().get_by_phone("0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_card_codes_are_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut w = db.begin_write().await.unwrap();
        let a = insert_customer(w.conn(), "A", "1").await.unwrap();
        let b = insert_customer(w.conn(), "B", "2").await.unwrap();

        let carded = set_card_code(w.conn(), a.id, "CARD-1").await.unwrap();
        assert!(carded.is_member());

        let err = set_card_code(w.conn(), b.id, "CARD-1").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = set_card_code(w.conn(), 999, "CARD-2").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        w.commit().await.unwrap();

        let holder = db.customers().get_by_card_code("CARD-1").await.unwrap().unwrap();
        assert_eq!(holder.id, a.id);
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut w = db.begin_write().await.unwrap();
        insert_customer(w.conn(), "A", "0901").await.unwrap();
        let err = insert_customer(w.conn(), "B", "0901").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
