//! Test doubles and common utilities for contract tests
//!
//! Each double records how it was called so tests can assert on the exact
//! sequence of external interactions a run performs.

#![allow(dead_code)]

use speedtest_ambient_core::config::{AmbientConfig, ReportingChannel};
use speedtest_ambient_core::error::{Error, Result};
use speedtest_ambient_core::telemetry::AmbientRecord;
use speedtest_ambient_core::traits::{
    AddrInfo, InterfaceSource, NetworkInterface, RouteLookup, SpeedTestResult, SpeedTester,
    TelemetryReporter,
};
use speedtest_ambient_core::{AddressFamily, RoutableAddress};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared, ordered log of external calls across all doubles
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// An InterfaceSource returning a fixed listing
#[derive(Clone)]
pub struct ScriptedInterfaceSource {
    listing: Option<Vec<NetworkInterface>>,
    call_count: Arc<AtomicUsize>,
    log: CallLog,
}

impl ScriptedInterfaceSource {
    /// One interface carrying the given `(family, local)` entries
    pub fn with_addresses(entries: &[(&str, &str)], log: &CallLog) -> Self {
        let addr_info = entries
            .iter()
            .map(|(family, local)| AddrInfo::new(*family, *local))
            .collect();
        Self::with_interfaces(
            vec![NetworkInterface {
                ifname: Some("eth0".to_string()),
                addr_info,
            }],
            log,
        )
    }

    pub fn with_interfaces(listing: Vec<NetworkInterface>, log: &CallLog) -> Self {
        Self {
            listing: Some(listing),
            call_count: Arc::new(AtomicUsize::new(0)),
            log: Arc::clone(log),
        }
    }

    /// A source whose listing command fails
    pub fn failing(log: &CallLog) -> Self {
        Self {
            listing: None,
            call_count: Arc::new(AtomicUsize::new(0)),
            log: Arc::clone(log),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InterfaceSource for ScriptedInterfaceSource {
    async fn list_interfaces(&self) -> Result<Vec<NetworkInterface>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push("list".to_string());
        self.listing
            .clone()
            .ok_or_else(|| Error::discovery("ip exited with status 1"))
    }
}

/// A RouteLookup answering with fixed text per family
#[derive(Clone)]
pub struct ScriptedRouteLookup {
    v4: Option<String>,
    v6: Option<String>,
    queries: Arc<Mutex<Vec<IpAddr>>>,
    log: CallLog,
}

impl ScriptedRouteLookup {
    /// `None` for a family makes its lookup fail
    pub fn new(v4: Option<&str>, v6: Option<&str>, log: &CallLog) -> Self {
        Self {
            v4: v4.map(str::to_string),
            v6: v6.map(str::to_string),
            queries: Arc::new(Mutex::new(Vec::new())),
            log: Arc::clone(log),
        }
    }

    /// Destinations queried so far, in order
    pub fn queries(&self) -> Vec<IpAddr> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RouteLookup for ScriptedRouteLookup {
    async fn route_get(&self, destination: IpAddr) -> Result<String> {
        self.queries.lock().unwrap().push(destination);
        self.log.lock().unwrap().push(format!("route {}", destination));
        let answer = if destination.is_ipv4() { &self.v4 } else { &self.v6 };
        answer
            .clone()
            .ok_or_else(|| Error::route_lookup(format!("no route answer for {}", destination)))
    }
}

/// A SpeedTester producing deterministic results
///
/// The n-th measurement (1-based) reports n ms latency so tests can tell
/// results apart after upload.
#[derive(Clone)]
pub struct ScriptedSpeedTester {
    fail_on: Option<String>,
    measured: Arc<Mutex<Vec<RoutableAddress>>>,
    log: CallLog,
}

impl ScriptedSpeedTester {
    pub fn new(log: &CallLog) -> Self {
        Self {
            fail_on: None,
            measured: Arc::new(Mutex::new(Vec::new())),
            log: Arc::clone(log),
        }
    }

    /// Fail when asked to measure `address`
    pub fn failing_on(address: &str, log: &CallLog) -> Self {
        Self {
            fail_on: Some(address.to_string()),
            ..Self::new(log)
        }
    }

    pub fn measured(&self) -> Vec<String> {
        self.measured
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.address.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl SpeedTester for ScriptedSpeedTester {
    async fn measure(&self, address: &RoutableAddress) -> Result<SpeedTestResult> {
        self.log.lock().unwrap().push(format!("measure {}", address));
        if self.fail_on.as_deref() == Some(address.address.as_str()) {
            return Err(Error::measurement(format!("speedtest failed for {}", address)));
        }

        let mut measured = self.measured.lock().unwrap();
        measured.push(address.clone());
        Ok(sample_result(measured.len() as f64))
    }
}

/// A TelemetryReporter that records uploads
#[derive(Clone)]
pub struct RecordingReporter {
    fail_on_channel: Option<String>,
    reports: Arc<Mutex<Vec<(String, AmbientRecord)>>>,
    log: CallLog,
}

impl RecordingReporter {
    pub fn new(log: &CallLog) -> Self {
        Self {
            fail_on_channel: None,
            reports: Arc::new(Mutex::new(Vec::new())),
            log: Arc::clone(log),
        }
    }

    /// Reject uploads to `channel_id` like a non-success HTTP response would
    pub fn failing_on_channel(channel_id: &str, log: &CallLog) -> Self {
        Self {
            fail_on_channel: Some(channel_id.to_string()),
            ..Self::new(log)
        }
    }

    /// `(channel id, record)` pairs in upload order
    pub fn reports(&self) -> Vec<(String, AmbientRecord)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TelemetryReporter for RecordingReporter {
    async fn report(&self, channel: &ReportingChannel, record: &AmbientRecord) -> Result<()> {
        self.log.lock().unwrap().push(format!("report {}", channel.id));
        if self.fail_on_channel.as_deref() == Some(channel.id.as_str()) {
            return Err(Error::reporting("Ambient responded 403 Forbidden"));
        }
        self.reports
            .lock()
            .unwrap()
            .push((channel.id.clone(), record.clone()));
        Ok(())
    }

    fn reporter_name(&self) -> &'static str {
        "recording"
    }
}

/// A result with the given latency and fixed throughput
pub fn sample_result(latency_ms: f64) -> SpeedTestResult {
    SpeedTestResult {
        timestamp: chrono::DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc),
        latency_ms,
        jitter_ms: 0.25,
        download_bytes_per_sec: 12_500_000,
        upload_bytes_per_sec: 2_500_000,
        packet_loss: None,
    }
}

/// Ambient configuration with `count` channels named "ch1", "ch2", ...
pub fn ambient_config(count: usize) -> AmbientConfig {
    AmbientConfig {
        channels: (1..=count)
            .map(|n| ReportingChannel::new(format!("ch{}", n), format!("key{}", n)))
            .collect(),
        ..AmbientConfig::default()
    }
}

pub fn v4(address: &str) -> RoutableAddress {
    RoutableAddress::new(address, AddressFamily::V4)
}

pub fn v6(address: &str) -> RoutableAddress {
    RoutableAddress::new(address, AddressFamily::V6)
}
