use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Backend used when neither `BACKEND_URL` nor a config file sets one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub network: NetworkConfig,
    pub refresh: RefreshConfig,
    pub notifications: NotificationConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL without the `/api` suffix.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    pub tick_interval_ms: u64,
    pub data_fetch_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            data_fetch_interval_secs: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Ntfy.sh topic that receives the bell (e.g., "masjid-bell-1447")
    pub ntfy_topic: Option<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ntfy_topic: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub imsak_offset_minutes: u32,
    /// Adzan countdowns below this are shown as urgent.
    pub urgent_threshold_secs: u64,
    pub clear_screen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            imsak_offset_minutes: 10,
            urgent_threshold_secs: 300,
            clear_screen: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present - production uses env vars directly)
        let _ = dotenvy::dotenv();

        let backend_url =
            std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mosque-display");

        let builder = Config::builder()
            // 1. Load default values
            // Backend
            .set_default("backend.base_url", backend_url)?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Refresh
            .set_default("refresh.tick_interval_ms", 1000)?
            .set_default("refresh.data_fetch_interval_secs", 300)?
            // Notifications
            .set_default("notifications.enabled", true)?
            .set_default("notifications.ntfy_topic", None::<String>)?
            // Display
            .set_default("display.imsak_offset_minutes", 10)?
            .set_default("display.urgent_threshold_secs", 300)?
            .set_default("display.clear_screen", true)?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (MOSQUE__REFRESH__TICK_INTERVAL_MS=...)
            .add_source(Environment::with_prefix("MOSQUE").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}
