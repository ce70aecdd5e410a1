use std::path::PathBuf;
use std::time::Duration;

/// Errors raised by a [`Channel`](crate::sync::Channel) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("no message from peer within {0:?}")]
    Timeout(Duration),

    #[error("receive cancelled")]
    Cancelled,

    #[error("peer closed the connection")]
    Closed,

    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while encoding, decoding or checking a game snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// Errors that end a networked match.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl SyncError {
    /// True when the peer stayed silent past the receive timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, SyncError::Channel(ChannelError::Timeout(_)))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
