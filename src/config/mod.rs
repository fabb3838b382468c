/// Database connection management and schema bootstrap
pub mod database;

/// Store settings from the environment and config.toml
pub mod settings;
