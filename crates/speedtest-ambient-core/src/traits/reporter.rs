// # Telemetry Reporter Trait
//
// Uploads one formatted measurement to one reporting channel.
//
// ## Implementations
//
// - Ambient data API: `speedtest-ambient-reporter` crate

use crate::config::ReportingChannel;
use crate::telemetry::AmbientRecord;
use async_trait::async_trait;

/// Trait for telemetry reporter implementations
///
/// Reporters are single-shot: one upload per call, no retries, no caching.
/// A non-success response from the service must be returned as an error.
/// The channel's write key must never be logged.
#[async_trait]
pub trait TelemetryReporter: Send + Sync {
    /// Upload `record` to `channel`
    async fn report(
        &self,
        channel: &ReportingChannel,
        record: &AmbientRecord,
    ) -> Result<(), crate::Error>;

    /// Reporter name (for logging)
    fn reporter_name(&self) -> &'static str;
}
