//! Measurement run orchestration
//!
//! A [`MeasurementRun`] performs exactly one pass of the pipeline and then
//! returns:
//!
//! ```text
//! ┌─────────────────┐   ┌─────────────┐
//! │ InterfaceSource │   │ RouteLookup │
//! └────────┬────────┘   └──────┬──────┘
//!          └──── discover ─────┘
//!                    │ Vec<RoutableAddress>
//!                    ▼
//!          ┌──────────────────┐     channel #n
//!          │  MeasurementRun  │◄──── (AmbientConfig)
//!          └──────────────────┘
//!            │              │
//!            ▼              ▼
//!   ┌─────────────┐  ┌───────────────────┐
//!   │ SpeedTester │  │ TelemetryReporter │
//!   │ (measure)   │  │ (report)          │
//!   └─────────────┘  └───────────────────┘
//! ```
//!
//! ## Ordering
//!
//! The n-th routable address is measured and reported to the n-th configured
//! channel. Everything runs sequentially; nothing is retried. The first error
//! ends the run, leaving the uploads made so far in place.

use crate::config::{AmbientConfig, ReportingChannel};
use crate::discovery::{self, RoutableAddress};
use crate::error::{Error, Result};
use crate::telemetry::AmbientRecord;
use crate::traits::{InterfaceSource, RouteLookup, SpeedTestResult, SpeedTester, TelemetryReporter};
use chrono::FixedOffset;
use tracing::{debug, info};

/// One measurement that was uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedMeasurement {
    /// The source address the test was bound to
    pub address: RoutableAddress,
    /// Channel the result went to
    pub channel_id: String,
    /// The measurement itself
    pub result: SpeedTestResult,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Uploaded measurements, in address order
    pub reported: Vec<ReportedMeasurement>,
    /// Configured channels no address was assigned to
    pub unused_channels: usize,
}

/// A single measurement run
pub struct MeasurementRun {
    /// Interface listing
    interfaces: Box<dyn InterfaceSource>,

    /// Route lookup used by the sieve
    routes: Box<dyn RouteLookup>,

    /// Speed test runner
    speed_tester: Box<dyn SpeedTester>,

    /// Telemetry upload
    reporter: Box<dyn TelemetryReporter>,

    /// Reporting channels, positionally matched to routable addresses
    channels: Vec<ReportingChannel>,

    /// Offset for the `created` timestamp
    utc_offset: FixedOffset,
}

impl MeasurementRun {
    /// Create a new measurement run
    ///
    /// # Parameters
    ///
    /// - `interfaces`: Interface listing implementation
    /// - `routes`: Route lookup implementation
    /// - `speed_tester`: Speed test implementation
    /// - `reporter`: Telemetry reporter implementation
    /// - `config`: Ambient configuration (channels and timestamp offset)
    pub fn new(
        interfaces: Box<dyn InterfaceSource>,
        routes: Box<dyn RouteLookup>,
        speed_tester: Box<dyn SpeedTester>,
        reporter: Box<dyn TelemetryReporter>,
        config: &AmbientConfig,
    ) -> Result<Self> {
        config.validate()?;
        let utc_offset = config.utc_offset()?;

        Ok(Self {
            interfaces,
            routes,
            speed_tester,
            reporter,
            channels: config.channels.clone(),
            utc_offset,
        })
    }

    /// Find the local addresses that are worth measuring
    pub async fn discover(&self) -> Result<Vec<RoutableAddress>> {
        discovery::discover(self.interfaces.as_ref(), self.routes.as_ref()).await
    }

    /// Run the whole pipeline once
    ///
    /// # Returns
    ///
    /// - `Ok(RunSummary)`: Every routable address was measured and reported
    /// - `Err(Error)`: The first failure; later addresses were not processed
    pub async fn run(&self) -> Result<RunSummary> {
        let addresses = self.discover().await?;

        if addresses.is_empty() {
            info!("No routable addresses found, nothing to measure");
        }

        let mut summary = RunSummary::default();

        for (index, address) in addresses.into_iter().enumerate() {
            // Resolve the channel first so a missing one does not cost a speed test
            let channel = self.channel_for(index)?;

            info!(
                "Measuring {} ({}) for channel {}",
                address, address.family, channel.id
            );
            let result = self.speed_tester.measure(&address).await?;
            info!(
                "{}: latency {:.2} ms, jitter {:.2} ms, down {:.2} Mbps, up {:.2} Mbps",
                address,
                result.latency_ms,
                result.jitter_ms,
                result.download_mbps(),
                result.upload_mbps()
            );

            let record = AmbientRecord::from_result(&result, self.utc_offset);
            self.reporter.report(channel, &record).await?;
            info!(
                "Reported {} to {} channel {}",
                address,
                self.reporter.reporter_name(),
                channel.id
            );

            summary.reported.push(ReportedMeasurement {
                address,
                channel_id: channel.id.clone(),
                result,
            });
        }

        summary.unused_channels = self.channels.len().saturating_sub(summary.reported.len());
        if summary.unused_channels > 0 {
            debug!("{} configured channel(s) left unused", summary.unused_channels);
        }

        Ok(summary)
    }

    /// The channel for the address at `index` (0-based)
    fn channel_for(&self, index: usize) -> Result<&ReportingChannel> {
        self.channels.get(index).ok_or(Error::ChannelsExhausted {
            position: index + 1,
            configured: self.channels.len(),
        })
    }
}
