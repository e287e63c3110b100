//! # Booking Engine
//!
//! The operations a presentation layer calls. Each one validates its input,
//! loads rows through the repositories, applies the `venue-core` rules and,
//! for writes, persists the outcome as one transaction under the writer lock.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  availability.rs   find_available_rooms                                 │
//! │  booking.rs        create_booking                                       │
//! │  ledger.rs         add_service, service_cost, booking_services          │
//! │  billing.rs        checkout, invoice_for_booking                        │
//! │  reporting.rs      revenue_by_room_type                                 │
//! │  mod.rs            catalog / customer / user lookups,                   │
//! │                    register_membership_card                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let engine = BookingEngine::open(&VenueConfig::load()?).await?;
//!
//! let booking = engine.create_booking(request).await?;
//! engine.add_service(booking.id, tiger_id, 5).await?;
//! let invoice = engine.checkout(booking.id, 2.5).await?;
//! ```

mod availability;
mod billing;
mod booking;
mod ledger;
mod reporting;

use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::VenueConfig;
use crate::error::EngineResult;
use crate::pool::Database;
use crate::repository::customer::{fetch_customer, fetch_customer_by_card, set_card_code};
use venue_core::billing::BillingPolicy;
use venue_core::validation::{validate_card_code, validate_phone, validate_room_query};
use venue_core::{
    Booking, CoreError, Customer, Room, RoomFilter, RoomType, Service, ServiceCategory, User,
    ValidationError,
};

/// Booking and billing operations over one database.
///
/// Cheap to clone; clones share the pool, the writer lock and the clock.
#[derive(Debug, Clone)]
pub struct BookingEngine {
    db: Database,
    policy: BillingPolicy,
    clock: Arc<dyn Clock>,
}

impl BookingEngine {
    /// Creates an engine with the default billing policy and the system clock.
    pub fn new(db: Database) -> Self {
        BookingEngine {
            db,
            policy: BillingPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Connects to the configured database and applies its billing policy.
    pub async fn open(config: &VenueConfig) -> EngineResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(BookingEngine::new(db).with_policy(config.billing))
    }

    /// Replaces the billing policy.
    pub fn with_policy(mut self, policy: BillingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// All room types, ordered by id.
    pub async fn room_types(&self) -> EngineResult<Vec<RoomType>> {
        Ok(self.db.catalog().room_types().await?)
    }

    /// Rooms matching the filter, ordered by id.
    ///
    /// ## Errors
    /// `InvalidArgument` when the name term is longer than 150 characters.
    pub async fn rooms(&self, filter: &RoomFilter) -> EngineResult<Vec<Room>> {
        let name_contains = match filter.name_contains.as_deref() {
            Some(term) => Some(validate_room_query(term)?),
            None => None,
        };

        let filter = RoomFilter {
            name_contains,
            room_type_id: filter.room_type_id,
        };
        Ok(self.db.catalog().rooms(&filter).await?)
    }

    /// A room by id.
    pub async fn room(&self, id: i64) -> EngineResult<Room> {
        self.db
            .catalog()
            .get_room(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Room", id).into())
    }

    /// All services, grouped by category.
    pub async fn services(&self) -> EngineResult<Vec<Service>> {
        Ok(self.db.catalog().services().await?)
    }

    pub async fn service_categories(&self) -> EngineResult<Vec<ServiceCategory>> {
        Ok(self.db.catalog().service_categories().await?)
    }

    // -------------------------------------------------------------------------
    // Bookings, customers, users
    // -------------------------------------------------------------------------

    /// A booking by id.
    pub async fn booking(&self, id: i64) -> EngineResult<Booking> {
        self.db
            .bookings()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", id).into())
    }

    /// The customer registered under an exact phone number, if any.
    pub async fn customer_by_phone(&self, phone: &str) -> EngineResult<Option<Customer>> {
        let phone = phone.trim();
        validate_phone(phone)?;
        Ok(self.db.customers().get_by_phone(phone).await?)
    }

    /// A staff account by username. No credential check happens here.
    pub async fn user_by_username(&self, username: &str) -> EngineResult<Option<User>> {
        Ok(self.db.users().get_by_username(username.trim()).await?)
    }

    /// Issues a membership card to a customer, making them eligible for the
    /// loyalty discount.
    ///
    /// Re-registering the code a customer already holds is a no-op; issuing
    /// a new code replaces the old one.
    ///
    /// ## Errors
    /// - `InvalidArgument` for a blank or over-long code, or one held by
    ///   another customer
    /// - `NotFound` for an unknown customer
    pub async fn register_membership_card(&self, customer_id: i64, card_code: &str) -> EngineResult<Customer> {
        let card_code = card_code.trim();
        validate_card_code(card_code)?;

        let mut tx = self.db.begin_write().await?;

        let customer = fetch_customer(tx.conn(), customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;

        if let Some(holder) = fetch_customer_by_card(tx.conn(), card_code).await? {
            if holder.id == customer.id {
                return Ok(holder);
            }
            warn!(customer_id, holder_id = holder.id, "Card code already issued");
            return Err(ValidationError::Duplicate {
                field: "card_code".to_string(),
                value: card_code.to_string(),
            }
            .into());
        }

        let updated = set_card_code(tx.conn(), customer.id, card_code).await?;
        tx.commit().await?;

        info!(customer_id, "Membership card registered");
        Ok(updated)
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::testing::*;
    use venue_core::{ErrorKind, RoomFilter, RoomStatus};

    #[tokio::test]
    async fn test_catalog_lookups() {
        let engine = engine().await;

        let types = engine.room_types().await.unwrap();
        assert_eq!(types.len(), 4);
        assert_eq!(types[0].name, "Phòng đôi");

        let rooms = engine.rooms(&RoomFilter::default()).await.unwrap();
        assert_eq!(rooms.len(), 5);
        assert!(rooms.windows(2).all(|w| w[0].id < w[1].id));
        assert!(rooms.iter().all(|r| r.status == RoomStatus::Available));

        let vip = engine
            .rooms(&RoomFilter {
                name_contains: Some(" VIP ".into()),
                room_type_id: None,
            })
            .await
            .unwrap();
        let names: Vec<&str> = vip.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["VIP 01", "SVIP 01"]);

        let err = engine
            .rooms(&RoomFilter {
                name_contains: Some("x".repeat(151)),
                room_type_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let room = engine.room(rooms[0].id).await.unwrap();
        assert_eq!(room, rooms[0]);
        assert_eq!(engine.room(9_999).await.unwrap_err().kind(), ErrorKind::NotFound);

        assert_eq!(engine.services().await.unwrap().len(), 6);
        assert_eq!(engine.service_categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_booking_lookup_not_found() {
        let engine = engine().await;
        assert_eq!(engine.booking(42).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let engine = engine().await;

        let admin = engine.user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.password, "123");
        assert!(engine.user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_membership_card() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;

        engine.create_booking(request(room, "0901000001", 10, 11, 1)).await.unwrap();
        engine.create_booking(request(room, "0901000002", 12, 13, 1)).await.unwrap();

        let first = engine.customer_by_phone("0901000001").await.unwrap().unwrap();
        let second = engine.customer_by_phone("0901000002").await.unwrap().unwrap();
        assert!(!first.is_member());

        let carded = engine.register_membership_card(first.id, " VIP-001 ").await.unwrap();
        assert_eq!(carded.card_code.as_deref(), Some("VIP-001"));

        // Same holder again is fine
        engine.register_membership_card(first.id, "VIP-001").await.unwrap();

        let err = engine.register_membership_card(second.id, "VIP-001").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = engine.register_membership_card(9_999, "VIP-002").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = engine.register_membership_card(second.id, "  ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(engine.customer_by_phone("0909999999").await.unwrap().is_none());
        assert_eq!(
            engine.customer_by_phone("not a phone").await.unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
