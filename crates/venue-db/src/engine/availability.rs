//! Room availability search.

use tracing::debug;

use super::BookingEngine;
use crate::error::EngineResult;
use crate::repository::booking::fetch_active_on;
use venue_core::availability::select_available;
use venue_core::{AvailabilityQuery, Room, RoomFilter};

impl BookingEngine {
    /// Rooms that can host `query.guest_count` guests on `query.date` from
    /// `query.start_time` to `query.end_time`, ordered by room id.
    ///
    /// Read-only. A room qualifies when its type's capacity covers the party
    /// and it has no active booking overlapping the window.
    ///
    /// ## Errors
    /// `InvalidArgument` when the window is empty or inverted, or the guest
    /// count is not positive.
    pub async fn find_available_rooms(&self, query: AvailabilityQuery) -> EngineResult<Vec<Room>> {
        query.window()?;

        let catalog = self.db.catalog();
        let rooms = catalog.rooms(&RoomFilter::default()).await?;
        let room_types = catalog.room_types().await?;
        let bookings = fetch_active_on(self.db.pool(), query.date).await?;

        let available = select_available(&query, &rooms, &room_types, &bookings)?;

        debug!(
            date = %query.date,
            start = %query.start_time,
            end = %query.end_time,
            guests = query.guest_count,
            available = available.len(),
            "Availability search"
        );
        Ok(available)
    }
}
