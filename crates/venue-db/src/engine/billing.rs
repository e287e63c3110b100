//! Checkout and invoices.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin_write                                                            │
//! │    booking missing?                    → NotFound                       │
//! │    booking Completed?                  → BookingAlreadyCompleted        │
//! │    load room type, customer, service lines                              │
//! │    visits = history rows this month    (before our own row)             │
//! │    compute_invoice(...)                 venue-core, pure                │
//! │    UPDATE booking → completed          guarded on status = 'booked'     │
//! │    INSERT invoice                      UNIQUE(booking_id)               │
//! │    INSERT membership history           carded customers only           │
//! │    room → available                    unless still actively booked     │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use super::BookingEngine;
use crate::error::EngineResult;
use crate::repository::booking::{count_active_for_room, fetch_booking, mark_completed};
use crate::repository::catalog::{fetch_room, fetch_room_type, set_room_status};
use crate::repository::customer::fetch_customer;
use crate::repository::invoice::insert_invoice;
use crate::repository::membership::{count_visits_in_month, insert_history};
use crate::repository::service_order::fetch_lines;
use venue_core::billing::{compute_invoice, BillingInput};
use venue_core::validation::validate_actual_hours;
use venue_core::{CoreError, Invoice, RoomStatus};

impl BookingEngine {
    /// Completes a booking and issues its invoice.
    ///
    /// `actual_hours` is what staff enter at checkout; it may differ from the
    /// booked window and may be fractional.
    ///
    /// ## Errors
    /// - `InvalidArgument`: `actual_hours` not finite or ≤ 0
    /// - `NotFound`: unknown booking
    /// - `BookingAlreadyCompleted`: checked out before (also the outcome for
    ///   every loser of a concurrent double checkout)
    pub async fn checkout(&self, booking_id: i64, actual_hours: f64) -> EngineResult<Invoice> {
        validate_actual_hours(actual_hours)?;

        let mut tx = self.db.begin_write().await?;

        let booking = fetch_booking(tx.conn(), booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;
        if !booking.is_active() {
            warn!(booking_id, "Repeated checkout rejected");
            return Err(CoreError::BookingAlreadyCompleted(booking_id).into());
        }

        let room = fetch_room(tx.conn(), booking.room_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Room", booking.room_id))?;
        let room_type = fetch_room_type(tx.conn(), room.room_type_id)
            .await?
            .ok_or_else(|| CoreError::not_found("RoomType", room.room_type_id))?;
        let customer = fetch_customer(tx.conn(), booking.customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", booking.customer_id))?;
        let lines = fetch_lines(tx.conn(), booking.id).await?;

        let now = self.clock.now();
        let today = now.date();

        let visits_this_month = if customer.is_member() {
            count_visits_in_month(tx.conn(), customer.id, today).await?
        } else {
            0
        };

        let amounts = compute_invoice(
            &BillingInput {
                hourly_rate: room_type.hourly_price(),
                actual_hours,
                service_lines: &lines,
                is_member: customer.is_member(),
                visits_this_month,
            },
            &self.policy,
        )?;

        if !mark_completed(tx.conn(), booking.id).await? {
            return Err(CoreError::BookingAlreadyCompleted(booking_id).into());
        }

        let invoice = insert_invoice(tx.conn(), booking.id, now, &amounts).await?;

        if customer.is_member() {
            insert_history(tx.conn(), customer.id, Some(booking.id), today, amounts.discount_bps).await?;
        }

        if count_active_for_room(tx.conn(), room.id).await? == 0 {
            set_room_status(tx.conn(), room.id, RoomStatus::Available).await?;
        }

        tx.commit().await?;

        info!(
            booking_id,
            invoice_id = invoice.id,
            gross = %amounts.gross,
            total = %invoice.total(),
            discount_bps = amounts.discount_bps,
            visits_this_month,
            "Invoice issued"
        );
        Ok(invoice)
    }

    /// The invoice of a booking; `None` until it is checked out.
    ///
    /// ## Errors
    /// `NotFound` for an unknown booking.
    pub async fn invoice_for_booking(&self, booking_id: i64) -> EngineResult<Option<Invoice>> {
        if fetch_booking(self.db.pool(), booking_id).await?.is_none() {
            return Err(CoreError::not_found("Booking", booking_id).into());
        }

        Ok(self.db.invoices().get_by_booking(booking_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::*;
    use crate::clock::FixedClock;
    use venue_core::{BookingStatus, ErrorKind, RoomStatus};

    #[tokio::test]
    async fn test_plain_checkout() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;
        let booking = engine.create_booking(request(room, "0921", 18, 21, 2)).await.unwrap();

        let invoice = engine.checkout(booking.id, 3.0).await.unwrap();
        assert_eq!(invoice.booking_id, booking.id);
        assert_eq!(invoice.room_cost, 300_000);
        assert_eq!(invoice.service_cost, 0);
        assert_eq!(invoice.discount_bps, 0);
        assert_eq!(invoice.sub_total, 300_000);
        assert_eq!(invoice.vat, 30_000);
        assert_eq!(invoice.total_amount, 330_000);
        assert_eq!(invoice.payment_date, now());

        assert_eq!(engine.booking(booking.id).await.unwrap().status, BookingStatus::Completed);
        assert_eq!(engine.room(room).await.unwrap().status, RoomStatus::Available);
        assert_eq!(engine.invoice_for_booking(booking.id).await.unwrap(), Some(invoice));

        // Non-members leave no history
        let history = engine
            .database()
            .memberships()
            .history_for_customer(booking.customer_id)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_services_and_fractional_hours() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;
        let booking = engine.create_booking(request(room, "0922", 18, 20, 4)).await.unwrap();
        engine.add_service(booking.id, service_id(&engine, "Tiger").await, 5).await.unwrap();
        engine.add_service(booking.id, service_id(&engine, "Pepsi").await, 2).await.unwrap();

        let invoice = engine.checkout(booking.id, 1.5).await.unwrap();
        assert_eq!(invoice.room_cost, 300_000);
        assert_eq!(invoice.service_cost, 185_000);
        assert_eq!(invoice.sub_total, 485_000);
        assert_eq!(invoice.vat, 48_500);
        assert_eq!(invoice.total_amount, 533_500);
    }

    #[tokio::test]
    async fn test_tenth_visit_earns_discount() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;

        // Ten completed visits this month
        let first = engine.create_booking(request(room, "0923", 0, 1, 1)).await.unwrap();
        engine.register_membership_card(first.customer_id, "LOYAL-1").await.unwrap();
        engine.checkout(first.id, 1.0).await.unwrap();
        for hour in 1..10 {
            let b = engine.create_booking(request(room, "0923", hour, hour + 1, 1)).await.unwrap();
            let invoice = engine.checkout(b.id, 1.0).await.unwrap();
            assert_eq!(invoice.discount_bps, 0, "visit {} is not discounted", hour + 1);
        }

        let visits = engine
            .database()
            .memberships()
            .visits_in_month(first.customer_id, date())
            .await
            .unwrap();
        assert_eq!(visits, 10);

        let booking = engine.create_booking(request(room, "0923", 12, 14, 2)).await.unwrap();
        let invoice = engine.checkout(booking.id, 2.0).await.unwrap();
        assert_eq!(invoice.room_cost, 200_000);
        assert_eq!(invoice.discount_bps, 500);
        assert_eq!(invoice.sub_total, 190_000);
        assert_eq!(invoice.vat, 19_000);
        assert_eq!(invoice.total_amount, 209_000);

        let history = engine
            .database()
            .memberships()
            .history_for_customer(first.customer_id)
            .await
            .unwrap();
        assert_eq!(history.len(), 11);
        let last = history.last().unwrap();
        assert_eq!(last.booking_id, Some(booking.id));
        assert_eq!(last.usage_date, date());
        assert_eq!(last.applied_discount_bps, 500);
    }

    #[tokio::test]
    async fn test_visits_reset_with_the_month() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;

        let first = engine.create_booking(request(room, "0924", 0, 1, 1)).await.unwrap();
        engine.register_membership_card(first.customer_id, "LOYAL-2").await.unwrap();
        engine.checkout(first.id, 1.0).await.unwrap();
        for hour in 1..10 {
            let b = engine.create_booking(request(room, "0924", hour, hour + 1, 1)).await.unwrap();
            engine.checkout(b.id, 1.0).await.unwrap();
        }

        let april = chrono::NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let next_month = engine.clone().with_clock(Arc::new(FixedClock(april)));

        let booking = next_month.create_booking(request(room, "0924", 12, 14, 2)).await.unwrap();
        let invoice = next_month.checkout(booking.id, 2.0).await.unwrap();
        assert_eq!(invoice.discount_bps, 0);
        assert_eq!(invoice.total_amount, 220_000);
    }

    #[tokio::test]
    async fn test_checkout_errors() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;
        let booking = engine.create_booking(request(room, "0925", 18, 20, 2)).await.unwrap();

        for hours in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = engine.checkout(booking.id, hours).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert!(engine.invoice_for_booking(booking.id).await.unwrap().is_none());

        let err = engine.checkout(9_999, 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = engine.invoice_for_booking(9_999).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        engine.checkout(booking.id, 2.0).await.unwrap();
        let err = engine.checkout(booking.id, 2.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BookingAlreadyCompleted);
    }

    #[tokio::test]
    async fn test_hours_beyond_one_day_rejected() {
        let engine = engine().await;
        let room = room_id(&engine, "Đôi 01").await;
        let booking = engine.create_booking(request(room, "0929", 18, 20, 2)).await.unwrap();

        for hours in [24.5, 1e300] {
            let err = engine.checkout(booking.id, hours).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert_eq!(engine.booking(booking.id).await.unwrap().status, BookingStatus::Booked);
        assert_eq!(engine.room(room).await.unwrap().status, RoomStatus::Occupied);
        assert!(engine.invoice_for_booking(booking.id).await.unwrap().is_none());

        let invoice = engine.checkout(booking.id, 24.0).await.unwrap();
        assert_eq!(invoice.room_cost, 2_400_000);
        assert_eq!(invoice.total_amount, 2_640_000);
    }

    #[tokio::test]
    async fn test_unrepresentable_total_leaves_booking_open() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;
        let catalog = engine.database().catalog();
        let drink = catalog.find_category_by_name("Drink").await.unwrap().unwrap();
        let vintage = catalog.insert_service("Vang cổ", i64::MAX / 4, drink.id).await.unwrap();

        let mut member = request(room, "0930", 18, 20, 4);
        member.customer_name = "Trần Thị B".to_string();
        let booking = engine.create_booking(member).await.unwrap();
        engine
            .register_membership_card(booking.customer_id, "VIP-0930")
            .await
            .unwrap();
        engine.add_service(booking.id, vintage.id, 5).await.unwrap();

        let err = engine.service_cost(booking.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = engine.checkout(booking.id, 2.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(engine.booking(booking.id).await.unwrap().status, BookingStatus::Booked);
        assert_eq!(engine.room(room).await.unwrap().status, RoomStatus::Occupied);
        assert!(engine.invoice_for_booking(booking.id).await.unwrap().is_none());
        let history = engine
            .database()
            .memberships()
            .history_for_customer(booking.customer_id)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_room_stays_occupied_while_another_booking_is_active() {
        let engine = engine().await;
        let room = room_id(&engine, "VIP 01").await;

        let early = engine.create_booking(request(room, "0926", 14, 16, 4)).await.unwrap();
        engine.create_booking(request(room, "0927", 18, 20, 4)).await.unwrap();

        engine.checkout(early.id, 2.0).await.unwrap();
        assert_eq!(engine.room(room).await.unwrap().status, RoomStatus::Occupied);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_double_checkout() {
        let (engine, path) = file_engine().await;
        let room = room_id(&engine, "Đôi 02").await;
        let booking = engine.create_booking(request(room, "0928", 18, 20, 2)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move { engine.checkout(booking.id, 2.0).await }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(invoice) => {
                    succeeded += 1;
                    assert_eq!(invoice.total_amount, 220_000);
                }
                Err(err) => assert_eq!(err.kind(), ErrorKind::BookingAlreadyCompleted),
            }
        }
        assert_eq!(succeeded, 1);
        assert!(engine.invoice_for_booking(booking.id).await.unwrap().is_some());

        remove_db_files(engine, path).await;
    }
}
