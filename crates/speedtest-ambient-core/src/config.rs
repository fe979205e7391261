//! Configuration types for speedtest-ambient
//!
//! The configuration is loaded once at startup from a TOML file and passed
//! explicitly to the components that need it.
//!
//! ```toml
//! [ambient]
//! channels = [
//!     { id = 12345, write_key = "0123456789abcdef" },
//!     { id = "67890", write_key = "fedcba9876543210" },
//! ]
//!
//! [speedtest]
//! binary = "speedtest"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "SPEEDTEST_AMBIENT_CONFIG";

/// File name under `$HOME/.config`
pub const CONFIG_FILE_NAME: &str = "speedtest-ambient.toml";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reporting destinations
    pub ambient: AmbientConfig,

    /// Speed test runner settings
    #[serde(default)]
    pub speedtest: SpeedtestConfig,
}

impl AppConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, crate::Error> {
        let config: Self = toml::from_str(content)
            .map_err(|e| crate::Error::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| {
            crate::Error::config(format!("{} ({})", e, path.display()))
        })?;
        info!(
            path = %path.display(),
            channels = config.ambient.channels.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Resolve the configuration file location
    ///
    /// `SPEEDTEST_AMBIENT_CONFIG` wins when set; otherwise the file lives at
    /// `$HOME/.config/speedtest-ambient.toml`.
    pub fn default_path() -> Result<PathBuf, crate::Error> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                crate::Error::config(format!(
                    "HOME is not set; set {} to the configuration file path",
                    CONFIG_PATH_ENV
                ))
            })?;

        Ok(Path::new(&home).join(".config").join(CONFIG_FILE_NAME))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.ambient.validate()?;
        self.speedtest.validate()?;
        Ok(())
    }
}

/// Ambient reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConfig {
    /// Reporting channels, consumed in the order routable addresses are found
    #[serde(default)]
    pub channels: Vec<ReportingChannel>,

    /// Ambient API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fixed UTC offset (hours) used for the `created` timestamp
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl AmbientConfig {
    /// Validate the Ambient configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.channels.is_empty() {
            warn!("No Ambient channels configured; any routable address will fail the run");
        }

        for (index, channel) in self.channels.iter().enumerate() {
            if channel.id.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "Ambient channel #{} has an empty id",
                    index + 1
                )));
            }
            if channel.write_key.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "Ambient channel #{} ({}) has an empty write_key",
                    index + 1,
                    channel.id
                )));
            }
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Ambient base_url must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }

        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(crate::Error::config(format!(
                "utc_offset_hours must be between -23 and 23. Got: {}",
                self.utc_offset_hours
            )));
        }

        Ok(())
    }

    /// The configured offset as a chrono timezone
    pub fn utc_offset(&self) -> Result<chrono::FixedOffset, crate::Error> {
        chrono::FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            crate::Error::config(format!(
                "Invalid utc_offset_hours: {}",
                self.utc_offset_hours
            ))
        })
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            base_url: default_base_url(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

/// One Ambient channel: where a single address's measurements go
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingChannel {
    /// Channel id (integers and strings are both accepted)
    #[serde(deserialize_with = "deserialize_channel_id")]
    pub id: String,

    /// Channel write key
    /// ⚠️ NEVER log this value
    pub write_key: String,
}

impl ReportingChannel {
    /// Create a new reporting channel
    pub fn new(id: impl Into<String>, write_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            write_key: write_key.into(),
        }
    }
}

// Custom Debug implementation that hides the write key
impl std::fmt::Debug for ReportingChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingChannel")
            .field("id", &self.id)
            .field("write_key", &"<REDACTED>")
            .finish()
    }
}

fn deserialize_channel_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChannelId {
        Number(u64),
        Text(String),
    }

    Ok(match ChannelId::deserialize(deserializer)? {
        ChannelId::Number(n) => n.to_string(),
        ChannelId::Text(s) => s,
    })
}

/// Speed test runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedtestConfig {
    /// Speed test executable (looked up in PATH unless absolute)
    #[serde(default = "default_speedtest_binary")]
    pub binary: String,

    /// Pass `--accept-license --accept-gdpr` to the CLI
    #[serde(default)]
    pub accept_license: bool,
}

impl SpeedtestConfig {
    /// Validate the speed test configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.binary.trim().is_empty() {
            return Err(crate::Error::config("speedtest binary cannot be empty"));
        }
        Ok(())
    }
}

impl Default for SpeedtestConfig {
    fn default() -> Self {
        Self {
            binary: default_speedtest_binary(),
            accept_license: false,
        }
    }
}

fn default_base_url() -> String {
    "http://ambidata.io/api/v2".to_string()
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_speedtest_binary() -> String {
    "speedtest".to_string()
}
