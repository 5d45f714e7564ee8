//! Errors raised while indexing crowdfund events and serving them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("event store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("event store migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Soroban RPC transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON-RPC error that retrying will not fix.
    #[error("Soroban RPC rejected getEvents (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid indexer configuration: {0}")]
    Config(String),

    #[error("malformed crowdfund event: {0}")]
    EventParse(String),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
