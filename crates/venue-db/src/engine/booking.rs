//! Booking creation.
//!
//! ## Steps
//! ```text
//! validate name, phone, window, guests        (no lock held)
//!      │
//!      ▼
//! begin_write ── writer lock + BEGIN
//!      │
//!      ├── load room + room type               → NotFound
//!      ├── capacity check                      → CapacityExceeded
//!      ├── active bookings of the room on date
//!      │   overlap check                       → RoomUnavailable
//!      ├── resolve or create customer by phone
//!      ├── insert booking (Booked)
//!      └── room → Occupied
//!      │
//!      ▼
//! COMMIT ── lock released
//! ```
//! Any early return drops the transaction, which rolls it back.

use tracing::{info, warn};

use super::BookingEngine;
use crate::error::EngineResult;
use crate::repository::booking::{fetch_active_for_room, insert_booking};
use crate::repository::catalog::{fetch_room, fetch_room_type, set_room_status};
use crate::repository::customer::resolve_or_create;
use venue_core::availability::{ensure_bookable, BookingWindow};
use venue_core::validation::{validate_customer_name, validate_guest_count, validate_phone};
use venue_core::{Booking, CoreError, NewBooking, RoomStatus};

impl BookingEngine {
    /// Books a room for a customer identified by phone number.
    ///
    /// A customer is created on the first booking under a phone; later
    /// bookings reuse it and leave its stored name unchanged.
    ///
    /// ## Errors
    /// - `InvalidArgument`: blank name, malformed phone, empty window,
    ///   non-positive guest count
    /// - `NotFound`: unknown room
    /// - `CapacityExceeded`: more guests than the room type holds (or > 15)
    /// - `RoomUnavailable`: the window overlaps an active booking of the room
    pub async fn create_booking(&self, request: NewBooking) -> EngineResult<Booking> {
        let name = request.customer_name.trim();
        let phone = request.phone.trim();
        validate_customer_name(name)?;
        validate_phone(phone)?;
        let window = BookingWindow::new(request.booking_date, request.start_time, request.end_time)?;
        validate_guest_count(request.guest_count)?;

        let mut tx = self.db.begin_write().await?;

        let room = fetch_room(tx.conn(), request.room_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Room", request.room_id))?;
        let room_type = fetch_room_type(tx.conn(), room.room_type_id)
            .await?
            .ok_or_else(|| CoreError::not_found("RoomType", room.room_type_id))?;

        let existing = fetch_active_for_room(tx.conn(), room.id, window.date).await?;
        if let Err(err) = ensure_bookable(&room, &room_type, &window, request.guest_count, &existing) {
            warn!(room_id = room.id, date = %window.date, error = %err, "Booking rejected");
            return Err(err.into());
        }

        let customer = resolve_or_create(tx.conn(), name, phone).await?;
        let booking = insert_booking(tx.conn(), customer.id, room.id, &window, request.guest_count).await?;
        set_room_status(tx.conn(), room.id, RoomStatus::Occupied).await?;

        tx.commit().await?;

        info!(
            booking_id = booking.id,
            room_id = room.id,
            customer_id = customer.id,
            date = %window.date,
            start = %window.start,
            end = %window.end,
            hours = window.hours(),
            "Booking created"
        );
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use venue_core::{BookingStatus, ErrorKind, RoomStatus};

    #[tokio::test]
    async fn test_create_booking_occupies_room() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;

        let booking = engine.create_booking(request(room, "0901234567", 18, 20, 4)).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Booked);
        assert_eq!(booking.room_id, room);
        assert_eq!(booking.guest_count, 4);
        assert_eq!(booking.start_time, t(18, 0));

        assert_eq!(engine.booking(booking.id).await.unwrap(), booking);
        assert_eq!(engine.room(room).await.unwrap().status, RoomStatus::Occupied);

        let customer = engine.customer_by_phone("0901234567").await.unwrap().unwrap();
        assert_eq!(customer.id, booking.customer_id);
        assert_eq!(customer.name, "Nguyễn Văn A");
        assert!(customer.card_code.is_none());
    }

    #[tokio::test]
    async fn test_repeat_phone_reuses_customer() {
        let engine = engine().await;
        let room = room_id(&engine, "VIP 01").await;

        let first = engine.create_booking(request(room, "0902", 10, 12, 2)).await.unwrap();
        let mut again = request(room, "0902", 12, 14, 3);
        again.customer_name = "Different Name".into();
        let second = engine.create_booking(again).await.unwrap();

        assert_eq!(first.customer_id, second.customer_id);
        let customer = engine.customer_by_phone("0902").await.unwrap().unwrap();
        assert_eq!(customer.name, "Nguyễn Văn A");
    }

    #[tokio::test]
    async fn test_capacity_exceeded() {
        let engine = engine().await;
        let double = room_id(&engine, "Đôi 01").await;
        let svip = room_id(&engine, "SVIP 01").await;

        let err = engine.create_booking(request(double, "0903", 18, 20, 3)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

        let err = engine.create_booking(request(svip, "0903", 18, 20, 16)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);

        engine.create_booking(request(svip, "0903", 18, 20, 15)).await.unwrap();

        // Rejected bookings leave no trace
        assert_eq!(engine.room(double).await.unwrap().status, RoomStatus::Available);
    }

    #[tokio::test]
    async fn test_overlap_rejected_adjacent_allowed() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 02").await;

        engine.create_booking(request(room, "0904", 18, 20, 2)).await.unwrap();

        let err = engine.create_booking(request(room, "0905", 19, 21, 2)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RoomUnavailable);
        assert!(engine.customer_by_phone("0905").await.unwrap().is_none());

        engine.create_booking(request(room, "0905", 20, 22, 2)).await.unwrap();
        engine.create_booking(request(room, "0905", 8, 18, 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;

        let cases = [
            request(room, "0906", 20, 18, 2),
            request(room, "0906", 18, 18, 2),
            request(room, "0906", 18, 20, 0),
            request(room, "abc", 18, 20, 2),
        ];
        for bad in cases {
            let err = engine.create_booking(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let mut nameless = request(room, "0906", 18, 20, 2);
        nameless.customer_name = "  ".into();
        let err = engine.create_booking(nameless).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = engine.create_booking(request(9_999, "0906", 18, 20, 2)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overlapping_bookings_admit_one() {
        let (engine, path) = file_engine().await;
        let room = room_id(&engine, "VIP 01").await;

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let engine = engine.clone();
            let phone = format!("09100000{:02}", i);
            // Every window covers 19:00-20:00
            let (start, end) = (17 + i % 3, 20 + i % 2);
            handles.push(tokio::spawn(async move {
                engine.create_booking(request(room, &phone, start, end, 2)).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.kind(), ErrorKind::RoomUnavailable),
            }
        }
        assert_eq!(created, 1);

        let active = engine.database().bookings().active_on(date()).await.unwrap();
        assert_eq!(active.iter().filter(|b| b.room_id == room).count(), 1);

        remove_db_files(engine, path).await;
    }
}
