//! # Demo Catalogue
//!
//! The venue's stock reference data: four room types, five rooms, food and
//! drink services, and two staff accounts. Used by the `seed` binary and by
//! engine tests.
//!
//! Seeding is idempotent: each entry is looked up by name and only inserted
//! when missing, so running it twice changes nothing.

use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::Database;
use venue_core::UserRole;

/// (name, capacity, hourly price)
pub const ROOM_TYPES: &[(&str, i64, i64)] = &[
    ("Phòng đôi", 2, 100_000),
    ("Phòng basic", 4, 200_000),
    ("Phòng vip", 8, 300_000),
    ("Phòng supper vip", 15, 500_000),
];

/// (room name, room type name)
pub const ROOMS: &[(&str, &str)] = &[
    ("Đôi 01", "Phòng đôi"),
    ("Đôi 02", "Phòng đôi"),
    ("Basic 01", "Phòng basic"),
    ("VIP 01", "Phòng vip"),
    ("SVIP 01", "Phòng supper vip"),
];

/// (category, [(service name, price)])
pub const SERVICES: &[(&str, &[(&str, i64)])] = &[
    (
        "Food",
        &[("Khô bò", 100_000), ("Đậu phộng", 50_000), ("Bim bim", 20_000)],
    ),
    (
        "Drink",
        &[("Tiger", 29_000), ("Pepsi", 20_000), ("Aqua", 15_000)],
    ),
];

/// (username, password, role)
pub const USERS: &[(&str, &str, UserRole)] = &[
    ("staff", "123", UserRole::Staff),
    ("admin", "123", UserRole::Admin),
];

/// Rows inserted by one [`seed_demo_data`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub room_types: usize,
    pub rooms: usize,
    pub services: usize,
    pub users: usize,
}

impl SeedSummary {
    /// True when nothing had to be inserted.
    pub fn is_empty(&self) -> bool {
        *self == SeedSummary::default()
    }
}

/// Inserts whatever part of the demo catalogue is missing.
pub async fn seed_demo_data(db: &Database) -> DbResult<SeedSummary> {
    let catalog = db.catalog();
    let mut summary = SeedSummary::default();

    for (name, capacity, price) in ROOM_TYPES {
        if catalog.find_room_type_by_name(name).await?.is_none() {
            catalog.insert_room_type(name, *capacity, *price).await?;
            summary.room_types += 1;
        }
    }

    for (name, type_name) in ROOMS {
        if catalog.find_room_by_name(name).await?.is_some() {
            continue;
        }
        // Room types were inserted above
        if let Some(room_type) = catalog.find_room_type_by_name(type_name).await? {
            catalog.insert_room(name, room_type.id).await?;
            summary.rooms += 1;
        }
    }

    for (category_name, items) in SERVICES {
        let category = match catalog.find_category_by_name(category_name).await? {
            Some(existing) => existing,
            None => catalog.insert_category(category_name).await?,
        };

        let existing = catalog.services_in_category(category.id).await?;
        for (name, price) in items.iter() {
            if existing.iter().any(|s| s.name == *name) {
                continue;
            }
            catalog.insert_service(name, *price, category.id).await?;
            summary.services += 1;
        }
    }

    let users = db.users();
    for (username, password, role) in USERS {
        if users.get_by_username(username).await?.is_none() {
            users.insert(username, password, *role).await?;
            summary.users += 1;
        }
    }

    debug!(?summary, "Seed pass finished");
    if !summary.is_empty() {
        info!(
            room_types = summary.room_types,
            rooms = summary.rooms,
            services = summary.services,
            users = summary.users,
            "Demo catalogue seeded"
        );
    }

    Ok(summary)
}
