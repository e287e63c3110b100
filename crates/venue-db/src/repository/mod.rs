//! # Repository Module
//!
//! Database repository implementations for the venue engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways Into The Same SQL                           │
//! │                                                                         │
//! │  Reads (no lock)                     Writes (inside begin_write)        │
//! │       │                                   │                             │
//! │  db.bookings().get_by_id(id)         booking::insert_booking(           │
//! │       │                                  tx.conn(), ...)                │
//! │       ▼                                   ▼                             │
//! │  BookingRepository { pool }          pub(crate) fn over                 │
//! │       │                              &mut SqliteConnection              │
//! │       └───────────────┬───────────────────┘                             │
//! │                       ▼                                                 │
//! │   fetch_* helpers generic over SqliteExecutor<'e>                       │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │                SQLite Database                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Room types, rooms, services
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers by id / phone / card
//! - [`BookingRepository`](booking::BookingRepository) - Bookings
//! - [`ServiceOrderRepository`](service_order::ServiceOrderRepository) - Services attached to bookings
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices and revenue entries
//! - [`MembershipRepository`](membership::MembershipRepository) - Loyalty visit history
//! - [`UserRepository`](user::UserRepository) - Staff accounts

pub mod booking;
pub mod catalog;
pub mod customer;
pub mod invoice;
pub mod membership;
pub mod service_order;
pub mod user;
