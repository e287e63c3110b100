//! # Catalog Repository
//!
//! Reference data: room types, rooms, service categories and services.
//!
//! ## Mutability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  room_types, service_categories, services   written once by seeding     │
//! │  rooms.status                               flipped by the engine:      │
//! │                                               create_booking → occupied │
//! │                                               checkout       → available│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups used inside a write transaction are module-level functions generic
//! over the executor, so the same SQL serves the pool and `&mut *tx`.

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use venue_core::{Room, RoomFilter, RoomStatus, RoomType, Service, ServiceCategory};

const ROOM_TYPE_COLUMNS: &str = "id, name, capacity, price";
const ROOM_COLUMNS: &str = "id, name, room_type_id, status";
const SERVICE_COLUMNS: &str = "id, name, price, category_id";

/// Repository for catalog reads and seeding writes.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
///
/// let vip = catalog.rooms(&RoomFilter {
///     name_contains: Some("vip".into()),
///     room_type_id: None,
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Room types
    // -------------------------------------------------------------------------

    /// Lists all room types ordered by id.
    pub async fn room_types(&self) -> DbResult<Vec<RoomType>> {
        let sql = format!("SELECT {ROOM_TYPE_COLUMNS} FROM room_types ORDER BY id");
        let types = sqlx::query_as::<_, RoomType>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(types)
    }

    /// Gets a room type by id.
    pub async fn get_room_type(&self, id: i64) -> DbResult<Option<RoomType>> {
        fetch_room_type(&self.pool, id).await
    }

    /// Gets a room type by its unique name.
    pub async fn find_room_type_by_name(&self, name: &str) -> DbResult<Option<RoomType>> {
        let sql = format!("SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE name = ?1");
        let room_type = sqlx::query_as::<_, RoomType>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(room_type)
    }

    /// Inserts a room type.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the name is taken
    /// - `CheckViolation` for a non-positive capacity or negative price
    pub async fn insert_room_type(&self, name: &str, capacity: i64, price: i64) -> DbResult<RoomType> {
        debug!(name = %name, capacity, price, "Inserting room type");

        let sql = format!(
            "INSERT INTO room_types (name, capacity, price) VALUES (?1, ?2, ?3) \
             RETURNING {ROOM_TYPE_COLUMNS}"
        );
        let room_type = sqlx::query_as::<_, RoomType>(&sql)
            .bind(name)
            .bind(capacity)
            .bind(price)
            .fetch_one(&self.pool)
            .await?;

        Ok(room_type)
    }

    /// Number of room types (seeding checks this before inserting).
    pub async fn count_room_types(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_types")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Rooms
    // -------------------------------------------------------------------------

    /// Lists rooms matching `filter`, ordered by id.
    ///
    /// `name_contains` matches anywhere in the name, ignoring ASCII case.
    /// A blank term does not filter.
    pub async fn rooms(&self, filter: &RoomFilter) -> DbResult<Vec<Room>> {
        let name = filter
            .name_contains
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        debug!(name = ?name, room_type_id = ?filter.room_type_id, "Listing rooms");

        let sql = format!(
            r#"
            SELECT {ROOM_COLUMNS}
            FROM rooms
            WHERE (?1 IS NULL OR instr(lower(name), lower(?1)) > 0)
            AND (?2 IS NULL OR room_type_id = ?2)
            ORDER BY id
            "#
        );
        let rooms = sqlx::query_as::<_, Room>(&sql)
            .bind(name)
            .bind(filter.room_type_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rooms)
    }

    /// Gets a room by id.
    pub async fn get_room(&self, id: i64) -> DbResult<Option<Room>> {
        fetch_room(&self.pool, id).await
    }

    /// Gets a room by its unique name.
    pub async fn find_room_by_name(&self, name: &str) -> DbResult<Option<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE name = ?1");
        let room = sqlx::query_as::<_, Room>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(room)
    }

    /// Inserts an available room of the given type.
    pub async fn insert_room(&self, name: &str, room_type_id: i64) -> DbResult<Room> {
        debug!(name = %name, room_type_id, "Inserting room");

        let sql = format!(
            "INSERT INTO rooms (name, room_type_id, status) VALUES (?1, ?2, ?3) \
             RETURNING {ROOM_COLUMNS}"
        );
        let room = sqlx::query_as::<_, Room>(&sql)
            .bind(name)
            .bind(room_type_id)
            .bind(RoomStatus::Available)
            .fetch_one(&self.pool)
            .await?;

        Ok(room)
    }

    /// Number of rooms.
    pub async fn count_rooms(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Services
    // -------------------------------------------------------------------------

    /// Lists service categories ordered by id.
    pub async fn service_categories(&self) -> DbResult<Vec<ServiceCategory>> {
        let categories = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name FROM service_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by name.
    pub async fn find_category_by_name(&self, name: &str) -> DbResult<Option<ServiceCategory>> {
        let category = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name FROM service_categories WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a service category.
    pub async fn insert_category(&self, name: &str) -> DbResult<ServiceCategory> {
        debug!(name = %name, "Inserting service category");

        let category = sqlx::query_as::<_, ServiceCategory>(
            "INSERT INTO service_categories (name) VALUES (?1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all services, grouped by category then by id.
    pub async fn services(&self) -> DbResult<Vec<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY category_id, id");
        let services = sqlx::query_as::<_, Service>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(services)
    }

    /// Lists the services of one category.
    pub async fn services_in_category(&self, category_id: i64) -> DbResult<Vec<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE category_id = ?1 ORDER BY id");
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(services)
    }

    /// Gets a service by id.
    pub async fn get_service(&self, id: i64) -> DbResult<Option<Service>> {
        fetch_service(&self.pool, id).await
    }

    /// Inserts a service.
    ///
    /// ## Errors
    /// - `ForeignKeyViolation` for an unknown category
    /// - `CheckViolation` for a negative price
    pub async fn insert_service(&self, name: &str, price: i64, category_id: i64) -> DbResult<Service> {
        debug!(name = %name, price, category_id, "Inserting service");

        let sql = format!(
            "INSERT INTO services (name, price, category_id) VALUES (?1, ?2, ?3) \
             RETURNING {SERVICE_COLUMNS}"
        );
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(name)
            .bind(price)
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(service)
    }

    /// Number of services.
    pub async fn count_services(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-generic lookups
// =============================================================================

pub(crate) async fn fetch_room_type<'e, E>(executor: E, id: i64) -> DbResult<Option<RoomType>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE id = ?1");
    let room_type = sqlx::query_as::<_, RoomType>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(room_type)
}

pub(crate) async fn fetch_room<'e, E>(executor: E, id: i64) -> DbResult<Option<Room>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?1");
    let room = sqlx::query_as::<_, Room>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(room)
}

pub(crate) async fn fetch_service<'e, E>(executor: E, id: i64) -> DbResult<Option<Service>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1");
    let service = sqlx::query_as::<_, Service>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(service)
}

/// Sets a room's status.
pub(crate) async fn set_room_status(conn: &mut SqliteConnection, room_id: i64, status: RoomStatus) -> DbResult<()> {
    debug!(room_id, status = ?status, "Updating room status");

    let result = sqlx::query("UPDATE rooms SET status = ?2 WHERE id = ?1")
        .bind(room_id)
        .bind(status)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Room", room_id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
