//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Defaults applied to journal change requests.
    #[serde(default)]
    pub defaults: ChangeDefaults,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Books snapshot used by the command line tool.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

/// Defaults for the options of a journal change request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChangeDefaults {
    /// Give moved entries a fresh number from the destination ledger.
    #[serde(default = "default_reset_sequence")]
    pub reset_sequence: bool,
    /// Move posted entries even when they are sealed by the hash chain.
    #[serde(default)]
    pub force_change: bool,
}

impl Default for ChangeDefaults {
    fn default() -> Self {
        Self {
            reset_sequence: default_reset_sequence(),
            force_change: false,
        }
    }
}

fn default_reset_sequence() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "rejournal=info".to_string()
}

/// Location of the books snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    /// Path to the JSON snapshot file.
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "books.json".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("REJOURNAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
