// # speedtest-ambient-core
//
// Core library for measuring network throughput per global-scope address and
// reporting the results to Ambient.
//
// ## Architecture Overview
//
// - **InterfaceSource**: Lists interfaces and their global-scope addresses
// - **RouteLookup**: Describes the route to a probe destination
// - **discovery**: Enumerator, family splitter and route sieve
// - **SpeedTester**: Measures from one source address
// - **TelemetryReporter**: Uploads one measurement to one channel
// - **MeasurementRun**: Runs discovery → measure → report once
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic lives here, tool and API
//    invocations live in their own crates
// 2. **Run-Once**: No daemon loop, no retries, no state between runs
// 3. **Positional Channels**: The n-th routable address reports to the n-th channel
// 4. **Fail Fast**: The first error ends the run

pub mod command;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod telemetry;
pub mod traits;

// Re-export core types for convenience
pub use traits::{InterfaceSource, RouteLookup, SpeedTester, TelemetryReporter};
pub use engine::{MeasurementRun, ReportedMeasurement, RunSummary};
pub use config::{AmbientConfig, AppConfig, ReportingChannel, SpeedtestConfig};
pub use discovery::{AddressFamily, AddressFamilyGroup, RoutableAddress};
pub use error::{Error, Result};
pub use telemetry::AmbientRecord;
