// # Ambient Telemetry Reporter
//
// Uploads one measurement per call to the Ambient IoT data platform
// (ambidata.io).
//
// ## Behaviour
//
// - One HTTP request per measurement, no retries
// - Non-success responses are mapped to reporting errors by status class
// - 5 second request timeout
// - Dry-run mode logs the request and sends nothing
//
// ## Security Requirements
//
// - Channel write keys NEVER appear in logs or Debug output
//
// ## API Reference
//
// ```http
// POST {base_url}/channels/{channel_id}/dataarray
// Content-Type: application/json
//
// {"writeKey": "...", "data": [{"d1": ..., "created": "YYYY-MM-DD HH:MM:SS"}]}
// ```

use async_trait::async_trait;
use serde_json::{Value, json};
use speedtest_ambient_core::config::{AmbientConfig, ReportingChannel};
use speedtest_ambient_core::telemetry::AmbientRecord;
use speedtest_ambient_core::traits::TelemetryReporter;
use speedtest_ambient_core::{Error, Result};
use std::time::Duration;

/// Default Ambient API base URL
pub const AMBIENT_API_BASE: &str = "http://ambidata.io/api/v2";

/// HTTP timeout for uploads
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable selecting dry-run mode (`dry-run`)
pub const MODE_ENV: &str = "SPEEDTEST_AMBIENT_MODE";

/// Ambient data API reporter
///
/// # Dry-Run Mode
///
/// When `dry_run` is true the reporter logs the target URL and the data
/// points it would have sent, and returns success without any network I/O.
pub struct AmbientReporter {
    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL without trailing slash
    base_url: String,

    /// Log instead of sending
    dry_run: bool,
}

// Custom Debug implementation that leaves out the HTTP client
impl std::fmt::Debug for AmbientReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientReporter")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl AmbientReporter {
    /// Create a new reporter
    ///
    /// # Parameters
    ///
    /// - `base_url`: Ambient API base, e.g. [`AMBIENT_API_BASE`]
    /// - `dry_run`: If true, log uploads instead of sending them
    pub fn new(base_url: impl Into<String>, dry_run: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dry_run,
        })
    }

    /// Create a reporter from configuration
    ///
    /// Dry-run mode is selected with `SPEEDTEST_AMBIENT_MODE=dry-run`.
    pub fn from_config(config: &AmbientConfig) -> Result<Self> {
        let dry_run = std::env::var(MODE_ENV)
            .unwrap_or_default()
            .to_lowercase()
            == "dry-run";

        if dry_run {
            tracing::warn!("Ambient reporter running in DRY-RUN mode - nothing will be uploaded");
        }

        Self::new(config.base_url.clone(), dry_run)
    }

    /// Whether uploads are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Upload URL for a channel
    pub fn url_for(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/dataarray", self.base_url, channel_id)
    }

    /// Request body for one data point
    pub fn payload(channel: &ReportingChannel, record: &AmbientRecord) -> Value {
        json!({
            "writeKey": channel.write_key,
            "data": [record],
        })
    }
}

#[async_trait]
impl TelemetryReporter for AmbientReporter {
    async fn report(&self, channel: &ReportingChannel, record: &AmbientRecord) -> Result<()> {
        let url = self.url_for(&channel.id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would POST to {} with data: {}",
                url,
                json!([record])
            );
            return Ok(());
        }

        tracing::debug!("Uploading {} field(s) to channel {}", record.data_len(), channel.id);

        let response = self
            .client
            .post(&url)
            .json(&Self::payload(channel, record))
            .send()
            .await
            .map_err(|e| {
                Error::reporting(format!(
                    "HTTP request to channel {} failed: {}",
                    channel.id,
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(Error::reporting(match status.as_u16() {
                401 | 403 => format!(
                    "Ambient rejected the write key for channel {}. Status: {}",
                    channel.id, status
                ),
                404 => format!("Ambient channel not found: {}", channel.id),
                429 => format!("Ambient rate limit exceeded. Status: {}", status),
                500..=599 => format!("Ambient server error: {} - {}", status, error_text.trim()),
                _ => format!("Upload failed: {} - {}", status, error_text.trim()),
            }));
        }

        tracing::debug!("Ambient accepted upload for channel {} ({})", channel.id, status);
        Ok(())
    }

    fn reporter_name(&self) -> &'static str {
        "ambient"
    }
}
