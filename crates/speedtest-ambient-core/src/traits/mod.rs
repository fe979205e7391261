//! Collaborator traits for speedtest-ambient
//!
//! Every external tool or service a run talks to sits behind one of these:
//!
//! - [`InterfaceSource`]: List interfaces and their global-scope addresses
//! - [`RouteLookup`]: Ask the routing table how a destination is reached
//! - [`SpeedTester`]: Measure latency and throughput from one source address
//! - [`TelemetryReporter`]: Upload one measurement to one channel

pub mod interface_source;
pub mod reporter;
pub mod route_lookup;
pub mod speed_tester;

pub use interface_source::{AddrInfo, InterfaceSource, NetworkInterface, parse_interface_listing};
pub use reporter::TelemetryReporter;
pub use route_lookup::RouteLookup;
pub use speed_tester::{SpeedTestResult, SpeedTester};
