//! Store settings loaded from the environment and an optional config.toml.
//!
//! Environment variables pick the database and bind address; the TOML file
//! can override the sales tax rate and the shipping options seeded into a
//! fresh database. Everything has a built-in default so the store runs with
//! no configuration at all.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Runtime settings for the storefront
#[derive(Debug, Clone)]
pub struct Settings {
    /// SeaORM connection string, from `DATABASE_URL`
    pub database_url: String,
    /// Address the HTTP server binds, from `BIND_ADDR`
    pub bind_addr: String,
    /// Sales tax rate applied to every checkout (e.g., 0.06)
    pub tax_rate: Decimal,
    /// Shipping options seeded into an empty database
    pub shipping: Vec<ShippingSeed>,
}

/// One shipping option to seed
#[derive(Debug, Deserialize, Clone)]
pub struct ShippingSeed {
    /// Display name of the method
    pub ship_type: String,
    /// Flat delivery cost in dollars
    pub cost: Decimal,
}

/// Overrides read from config.toml; every field is optional
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    tax_rate: Option<Decimal>,
    #[serde(default)]
    shipping: Vec<ShippingSeed>,
}

impl Settings {
    /// Loads settings from the environment and, when present, the TOML file
    /// named by `CONFIG_PATH` (default `./config.toml`).
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if a configured rate or cost is negative.
    pub fn load() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/eternal_elixirs.sqlite?mode=rwc".to_string());
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        let file = if Path::new(&config_path).exists() {
            load_file_config(&config_path)?
        } else {
            FileConfig::default()
        };

        let tax_rate = file.tax_rate.unwrap_or_else(default_tax_rate);
        if tax_rate < Decimal::ZERO {
            return Err(Error::Config {
                message: format!("tax_rate must not be negative, got {tax_rate}"),
            });
        }

        let shipping = if file.shipping.is_empty() {
            default_shipping()
        } else {
            file.shipping
        };
        if let Some(bad) = shipping.iter().find(|s| s.cost < Decimal::ZERO) {
            return Err(Error::Config {
                message: format!(
                    "shipping option '{}' has a negative cost {}",
                    bad.ship_type, bad.cost
                ),
            });
        }

        Ok(Self {
            database_url,
            bind_addr,
            tax_rate,
            shipping,
        })
    }
}

/// 6% sales tax unless the config file says otherwise
fn default_tax_rate() -> Decimal {
    Decimal::new(6, 2)
}

/// Standard, Express, and Overnight delivery at fixed rates
fn default_shipping() -> Vec<ShippingSeed> {
    vec![
        ShippingSeed {
            ship_type: "Standard".to_string(),
            cost: Decimal::new(499, 2),
        },
        ShippingSeed {
            ship_type: "Express".to_string(),
            cost: Decimal::new(999, 2),
        },
        ShippingSeed {
            ship_type: "Overnight".to_string(),
            cost: Decimal::new(2499, 2),
        },
    ]
}

/// Loads overrides from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}
