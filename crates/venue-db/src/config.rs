//! Engine configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::pool::DbConfig;
use venue_core::billing::BillingPolicy;
use venue_core::TaxRate;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size (default: 5)
    pub max_connections: u32,

    /// VAT rate, loyalty discount and loyalty threshold
    pub billing: BillingPolicy,
}

impl Default for VenueConfig {
    fn default() -> Self {
        VenueConfig {
            database_path: PathBuf::from("venue.db"),
            max_connections: 5,
            billing: BillingPolicy::default(),
        }
    }
}

impl VenueConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                        | Default    |
    /// |---------------------------------|------------|
    /// | `VENUE_DATABASE_PATH`           | `venue.db` |
    /// | `VENUE_DB_MAX_CONNECTIONS`      | `5`        |
    /// | `VENUE_VAT_BPS`                 | `1000`     |
    /// | `VENUE_LOYALTY_DISCOUNT_BPS`    | `500`      |
    /// | `VENUE_LOYALTY_VISIT_THRESHOLD` | `10`       |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = VenueConfig::default();

        let database_path = lookup("VENUE_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections: u32 = parse_or(&lookup, "VENUE_DB_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("VENUE_DB_MAX_CONNECTIONS".to_string()));
        }

        let vat_bps: u32 = parse_or(&lookup, "VENUE_VAT_BPS", defaults.billing.vat_rate.bps())?;

        let loyalty_discount_bps: u32 = parse_or(
            &lookup,
            "VENUE_LOYALTY_DISCOUNT_BPS",
            defaults.billing.loyalty_discount_bps,
        )?;
        if loyalty_discount_bps > 10_000 {
            return Err(ConfigError::InvalidValue("VENUE_LOYALTY_DISCOUNT_BPS".to_string()));
        }

        let loyalty_visit_threshold: i64 = parse_or(
            &lookup,
            "VENUE_LOYALTY_VISIT_THRESHOLD",
            defaults.billing.loyalty_visit_threshold,
        )?;

        Ok(VenueConfig {
            database_path,
            max_connections,
            billing: BillingPolicy {
                vat_rate: TaxRate::from_bps(vat_bps),
                loyalty_discount_bps,
                loyalty_visit_threshold,
            },
        })
    }

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
