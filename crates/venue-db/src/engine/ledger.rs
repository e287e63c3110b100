//! Service orders attached to bookings.

use tracing::{info, warn};

use super::BookingEngine;
use crate::error::EngineResult;
use crate::repository::booking::fetch_booking;
use crate::repository::catalog::fetch_service;
use crate::repository::service_order::{add_quantity, fetch_lines, fetch_order};
use venue_core::billing::service_cost;
use venue_core::validation::validate_quantity;
use venue_core::{CoreError, Money, ServiceLine, ServiceOrder};

impl BookingEngine {
    /// Attaches `quantity` of a service to a booking.
    ///
    /// Ordering a service the booking already has adds to its quantity.
    /// Concurrent calls are serialized, so no increment is lost.
    ///
    /// ## Errors
    /// - `InvalidArgument`: quantity ≤ 0, or the accumulated quantity would
    ///   exceed `MAX_SERVICE_QUANTITY`
    /// - `NotFound`: unknown booking or service
    /// - `BookingAlreadyCompleted`: the booking was checked out
    pub async fn add_service(&self, booking_id: i64, service_id: i64, quantity: i64) -> EngineResult<ServiceOrder> {
        validate_quantity(quantity)?;

        let mut tx = self.db.begin_write().await?;

        let booking = fetch_booking(tx.conn(), booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;
        if !booking.is_active() {
            warn!(booking_id, "Service order on completed booking rejected");
            return Err(CoreError::BookingAlreadyCompleted(booking_id).into());
        }

        let service = fetch_service(tx.conn(), service_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Service", service_id))?;

        let existing = fetch_order(tx.conn(), booking.id, service.id)
            .await?
            .map_or(0, |order| order.quantity);
        if let Err(err) = validate_quantity(existing + quantity) {
            warn!(booking_id, service_id, existing, added = quantity, "Service quantity over the ceiling");
            return Err(err.into());
        }

        let order = add_quantity(tx.conn(), booking.id, service.id, quantity).await?;
        tx.commit().await?;

        info!(
            booking_id,
            service_id,
            added = quantity,
            quantity = order.quantity,
            "Service ordered"
        );
        Ok(order)
    }

    /// Σ quantity × unit price over the booking's services; zero when none.
    ///
    /// ## Errors
    /// `NotFound` for an unknown booking.
    pub async fn service_cost(&self, booking_id: i64) -> EngineResult<Money> {
        let lines = self.booking_services(booking_id).await?;
        Ok(service_cost(&lines)?)
    }

    /// The booking's services with name, unit price and quantity.
    ///
    /// ## Errors
    /// `NotFound` for an unknown booking.
    pub async fn booking_services(&self, booking_id: i64) -> EngineResult<Vec<ServiceLine>> {
        let pool = self.db.pool();

        if fetch_booking(pool, booking_id).await?.is_none() {
            return Err(CoreError::not_found("Booking", booking_id).into());
        }

        Ok(fetch_lines(pool, booking_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use venue_core::{ErrorKind, MAX_SERVICE_QUANTITY};

    #[tokio::test]
    async fn test_quantities_accumulate() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;
        let tiger = service_id(&engine, "Tiger").await;
        let booking = engine.create_booking(request(room, "0911", 18, 20, 4)).await.unwrap();

        assert_eq!(engine.add_service(booking.id, tiger, 2).await.unwrap().quantity, 2);
        let order = engine.add_service(booking.id, tiger, 3).await.unwrap();
        assert_eq!(order.quantity, 5);

        let lines = engine.booking_services(booking.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[0].service_name, "Tiger");
    }

    #[tokio::test]
    async fn test_service_cost() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;
        let booking = engine.create_booking(request(room, "0912", 18, 20, 4)).await.unwrap();

        assert!(engine.service_cost(booking.id).await.unwrap().is_zero());

        engine.add_service(booking.id, service_id(&engine, "Tiger").await, 5).await.unwrap();
        engine.add_service(booking.id, service_id(&engine, "Khô bò").await, 1).await.unwrap();
        engine.add_service(booking.id, service_id(&engine, "Aqua").await, 2).await.unwrap();

        // 5 × 29000 + 100000 + 2 × 15000
        assert_eq!(engine.service_cost(booking.id).await.unwrap().minor(), 275_000);

        assert_eq!(engine.service_cost(9_999).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_add_service_errors() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;
        let pepsi = service_id(&engine, "Pepsi").await;
        let booking = engine.create_booking(request(room, "0913", 18, 20, 4)).await.unwrap();

        for qty in [0, -1] {
            let err = engine.add_service(booking.id, pepsi, qty).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let err = engine.add_service(9_999, pepsi, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = engine.add_service(booking.id, 9_999, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        engine.checkout(booking.id, 2.0).await.unwrap();
        let err = engine.add_service(booking.id, pepsi, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BookingAlreadyCompleted);

        assert!(engine.booking_services(booking.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quantity_ceiling() {
        let engine = engine().await;
        let room = room_id(&engine, "Basic 01").await;
        let tiger = service_id(&engine, "Tiger").await;
        let booking = engine.create_booking(request(room, "0915", 18, 20, 4)).await.unwrap();

        for qty in [MAX_SERVICE_QUANTITY + 1, i64::MAX / 2, i64::MAX] {
            let err = engine.add_service(booking.id, tiger, qty).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert!(engine.booking_services(booking.id).await.unwrap().is_empty());

        engine.add_service(booking.id, tiger, MAX_SERVICE_QUANTITY - 1).await.unwrap();
        let order = engine.add_service(booking.id, tiger, 1).await.unwrap();
        assert_eq!(order.quantity, MAX_SERVICE_QUANTITY);

        // The running total is bounded too, and a rejected call changes nothing.
        let err = engine.add_service(booking.id, tiger, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let order = engine
            .database()
            .service_orders()
            .get(booking.id, tiger)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.quantity, MAX_SERVICE_QUANTITY);

        // 10000 × 29000
        assert_eq!(engine.service_cost(booking.id).await.unwrap().minor(), 290_000_000);
        let invoice = engine.checkout(booking.id, 2.0).await.unwrap();
        assert_eq!(invoice.service_cost, 290_000_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let (engine, path) = file_engine().await;
        let room = room_id(&engine, "SVIP 01").await;
        let tiger = service_id(&engine, "Tiger").await;
        let booking = engine.create_booking(request(room, "0914", 18, 23, 10)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.add_service(booking.id, tiger, 1).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let order = engine
            .database()
            .service_orders()
            .get(booking.id, tiger)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.quantity, 10);

        remove_db_files(engine, path).await;
    }
}
