// # Speed Tester Trait
//
// Measures latency and throughput from one local source address.
//
// ## Implementations
//
// - Ookla `speedtest` CLI: `speedtest-ambient-ookla` crate

use crate::discovery::RoutableAddress;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of one speed test
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedTestResult {
    /// When the test ran
    pub timestamp: DateTime<Utc>,
    /// Idle latency in milliseconds
    pub latency_ms: f64,
    /// Latency jitter in milliseconds
    pub jitter_ms: f64,
    /// Download throughput in bytes per second
    pub download_bytes_per_sec: u64,
    /// Upload throughput in bytes per second
    pub upload_bytes_per_sec: u64,
    /// Packet loss, when the tool could determine it
    pub packet_loss: Option<f64>,
}

impl SpeedTestResult {
    /// Download throughput in megabits per second
    pub fn download_mbps(&self) -> f64 {
        bytes_per_sec_to_mbps(self.download_bytes_per_sec)
    }

    /// Upload throughput in megabits per second
    pub fn upload_mbps(&self) -> f64 {
        bytes_per_sec_to_mbps(self.upload_bytes_per_sec)
    }
}

fn bytes_per_sec_to_mbps(bytes_per_sec: u64) -> f64 {
    bytes_per_sec as f64 * 8.0 / 1000.0 / 1000.0
}

/// Trait for speed test implementations
///
/// Called once per routable address, strictly one at a time. Implementations
/// must not retry: a failure aborts the run.
#[async_trait]
pub trait SpeedTester: Send + Sync {
    /// Run one speed test bound to `address` as the local source
    async fn measure(&self, address: &RoutableAddress) -> Result<SpeedTestResult, crate::Error>;
}
