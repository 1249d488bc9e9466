//! Indexer error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event parse error: {0}")]
    EventParse(String),

    /// A stored amount column that is not a base-10 `u128`.
    #[error("Invalid amount {value:?} on event {event_id}")]
    InvalidAmount { event_id: String, value: String },

    #[error("Amount overflow while aggregating {0}")]
    AmountOverflow(&'static str),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
