//! # venue-db: Persistence and Booking Engine
//!
//! SQLite storage (via sqlx) for the venue, plus [`BookingEngine`], the
//! entry point a presentation layer calls for every booking and billing
//! operation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Venue Data Flow                                 │
//! │                                                                         │
//! │  Presentation layer (engine.create_booking(request))                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     venue-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ BookingEngine │───►│  Repositories │───►│   Database   │  │   │
//! │  │   │  (engine/)    │    │ (repository/) │    │  (pool.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ rules from    │    │ Catalog       │    │ SqlitePool   │  │   │
//! │  │   │ venue-core    │    │ Booking       │    │ writer lock  │  │   │
//! │  │   │ Clock         │    │ Invoice ...   │    │ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (VENUE_DATABASE_PATH, default ./venue.db)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `BookingEngine` operations
//! - [`pool`] - Connection pool, writer lock, repository accessors
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQL per table group
//! - [`config`] - Environment configuration
//! - [`clock`] - Injected source of "now"
//! - [`seed`] - Demo catalogue
//! - [`error`] - `DbError` and `EngineError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use venue_db::{BookingEngine, VenueConfig};
//!
//! let engine = BookingEngine::open(&VenueConfig::load()?).await?;
//!
//! let rooms = engine.find_available_rooms(query).await?;
//! let booking = engine.create_booking(request).await?;
//! let invoice = engine.checkout(booking.id, 2.0).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, VenueConfig};
pub use engine::BookingEngine;
pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig, WriteTransaction};

// Repository re-exports for convenience
pub use repository::booking::BookingRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::membership::MembershipRepository;
pub use repository::service_order::ServiceOrderRepository;
pub use repository::user::UserRepository;
