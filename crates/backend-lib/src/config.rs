// ============================
// naan-backend/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "naan.toml";

/// Prefix of environment overrides, e.g. `NAAN_HUB__OUTBOX_CAPACITY=128`
pub const ENV_PREFIX: &str = "NAAN_";

/// Development signing secret. Startup warns when it is still in use.
pub const DEV_JWT_SECRET: &str = "my_secret_key";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level, used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
    /// Kiosk hub tuning
    pub hub: HubSettings,
}

/// Queue sizes and deadlines of the kiosk hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HubSettings {
    /// Pending deliveries a room buffers before dispatch reports backpressure
    pub outbox_capacity: usize,
    /// How long a dispatch may wait for outbox space
    pub enqueue_timeout_ms: u64,
    /// Deadline for writing one frame to a kiosk
    pub write_timeout_secs: u64,
    /// A kiosk silent for this long is considered dead
    pub read_timeout_secs: u64,
    /// Interval of server pings; must be shorter than the read timeout
    pub ping_interval_secs: u64,
    /// Upper bound on room id length
    pub max_room_id_len: usize,
}

/// Problems found by [`Settings::validate`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown log level: {0}")]
    LogLevel(String),

    #[error("jwt_secret must not be empty")]
    EmptySecret,

    #[error("hub.{0} must be greater than zero")]
    Zero(&'static str),

    #[error("hub.ping_interval_secs ({ping}) must be shorter than hub.read_timeout_secs ({read})")]
    PingInterval { ping: u64, read: u64 },
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            log_level: "info".to_string(),
            json_logs: false,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            hub: HubSettings::default(),
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            outbox_capacity: 64,
            enqueue_timeout_ms: 250,
            write_timeout_secs: 10,
            read_timeout_secs: 60,
            ping_interval_secs: 20,
            max_room_id_len: 512,
        }
    }
}

impl HubSettings {
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

impl Settings {
    /// Load settings from `naan.toml` and `NAAN_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from the given TOML file (missing files are skipped),
    /// then environment variables
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Layered providers: defaults < TOML < env
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject settings the hub cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(SettingsError::LogLevel(self.log_level.clone()));
        }
        if self.jwt_secret.is_empty() {
            return Err(SettingsError::EmptySecret);
        }

        let hub = &self.hub;
        let non_zero = [
            ("outbox_capacity", hub.outbox_capacity as u64),
            ("enqueue_timeout_ms", hub.enqueue_timeout_ms),
            ("write_timeout_secs", hub.write_timeout_secs),
            ("read_timeout_secs", hub.read_timeout_secs),
            ("ping_interval_secs", hub.ping_interval_secs),
            ("max_room_id_len", hub.max_room_id_len as u64),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(SettingsError::Zero(*name));
        }

        if hub.ping_interval_secs >= hub.read_timeout_secs {
            return Err(SettingsError::PingInterval {
                ping: hub.ping_interval_secs,
                read: hub.read_timeout_secs,
            });
        }

        Ok(())
    }

    /// Whether the signing secret is still the development default
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
