// # Ookla Speed Tester
//
// This crate runs the official Ookla `speedtest` CLI bound to one local
// source address and decodes its JSON report:
//
// ```text
// speedtest --format json --ip <address>
// ```
//
// ## Report Fields Used
//
// - `timestamp` (ISO-8601)
// - `ping.latency`, `ping.jitter` (ms)
// - `download.bandwidth`, `upload.bandwidth` (bytes/s)
// - `packetLoss` (optional; absent when the server cannot measure it)
//
// The CLI asks to accept its license on first use. Either accept it once
// interactively for the user running the timer, or set
// `speedtest.accept_license = true` in the configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use speedtest_ambient_core::command::run_command;
use speedtest_ambient_core::config::SpeedtestConfig;
use speedtest_ambient_core::traits::{SpeedTestResult, SpeedTester};
use speedtest_ambient_core::{Error, Result, RoutableAddress};
use tracing::debug;

/// Ookla CLI speed tester
#[derive(Debug, Clone)]
pub struct OoklaSpeedTester {
    /// Executable to invoke
    binary: String,

    /// Pass the license/GDPR acceptance flags
    accept_license: bool,
}

impl OoklaSpeedTester {
    /// Create a tester for the given executable
    pub fn new(binary: impl Into<String>, accept_license: bool) -> Self {
        Self {
            binary: binary.into(),
            accept_license,
        }
    }

    /// Create a tester from configuration
    pub fn from_config(config: &SpeedtestConfig) -> Self {
        Self::new(config.binary.clone(), config.accept_license)
    }

    /// Command-line arguments for a test from `address`
    pub fn args(&self, address: &RoutableAddress) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            "json".to_string(),
            "--ip".to_string(),
            address.address.clone(),
        ];
        if self.accept_license {
            args.push("--accept-license".to_string());
            args.push("--accept-gdpr".to_string());
        }
        args
    }
}

#[async_trait]
impl SpeedTester for OoklaSpeedTester {
    async fn measure(&self, address: &RoutableAddress) -> Result<SpeedTestResult> {
        let output = run_command(&self.binary, self.args(address))
            .await
            .map_err(|e| Error::measurement(format!("{} (source {})", e, address)))?;

        let result = decode_report(&output.stdout)?;
        debug!("Decoded speedtest report for {}: {:?}", address, result);
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    timestamp: String,
    ping: Ping,
    download: Transfer,
    upload: Transfer,
    #[serde(default)]
    packet_loss: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Ping {
    latency: f64,
    jitter: f64,
}

#[derive(Debug, Deserialize)]
struct Transfer {
    bandwidth: u64,
}

/// Decode the JSON report printed by `speedtest --format json`
pub fn decode_report(json: &str) -> Result<SpeedTestResult> {
    let report: Report = serde_json::from_str(json)
        .map_err(|e| Error::measurement(format!("Malformed speedtest report: {}", e)))?;

    let timestamp = DateTime::parse_from_rfc3339(&report.timestamp)
        .map_err(|e| {
            Error::measurement(format!(
                "Invalid speedtest timestamp '{}': {}",
                report.timestamp, e
            ))
        })?
        .with_timezone(&Utc);

    Ok(SpeedTestResult {
        timestamp,
        latency_ms: report.ping.latency,
        jitter_ms: report.ping.jitter,
        download_bytes_per_sec: report.download.bandwidth,
        upload_bytes_per_sec: report.upload.bandwidth,
        packet_loss: report.packet_loss,
    })
}
