use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::sync::{CancelToken, ReceiveOptions, SnapshotPolicy};

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub players: PlayersConfig,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

/// Display names for the two sides.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    pub player_one: String,
    pub player_two: String,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        PlayersConfig {
            player_one: "player1".to_string(),
            player_two: "player2".to_string(),
        }
    }
}

/// Hosting address and peer synchronization settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    /// Seconds to wait for the peer's snapshot; 0 waits forever.
    pub receive_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_payload_bytes: usize,
    /// Reject snapshots that could not come out of a legal match.
    pub strict_snapshots: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_address: "0.0.0.0:4004".to_string(),
            receive_timeout_secs: 300,
            poll_interval_ms: 100,
            max_payload_bytes: crate::sync::tcp::DEFAULT_MAX_PAYLOAD,
            strict_snapshots: false,
        }
    }
}

impl NetworkConfig {
    pub fn receive_timeout(&self) -> Option<Duration> {
        match self.receive_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn receive_options(&self, cancel: CancelToken) -> ReceiveOptions {
        ReceiveOptions {
            timeout: self.receive_timeout(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            cancel,
        }
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        if self.strict_snapshots {
            SnapshotPolicy::Strict
        } else {
            SnapshotPolicy::Trusting
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Log destination. The terminal belongs to the UI.
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: PathBuf::from("connect-four.log"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Warning: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.player_one.trim().is_empty() || self.players.player_two.trim().is_empty() {
            return Err(ConfigError::Validation(
                "players names must not be empty".into(),
            ));
        }
        if self.players.player_one == self.players.player_two {
            return Err(ConfigError::Validation(
                "players.player_one and players.player_two must differ".into(),
            ));
        }
        if self.network.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network.bind_address must not be empty".into(),
            ));
        }
        if self.network.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "network.poll_interval_ms must be > 0".into(),
            ));
        }
        if self.network.max_payload_bytes < 1024 {
            return Err(ConfigError::Validation(
                "network.max_payload_bytes must be >= 1024".into(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.level must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
