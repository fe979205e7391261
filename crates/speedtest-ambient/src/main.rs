// # speedtest-ambient
//
// Run-once utility, usually started from a systemd timer or cron:
//
// 1. Read settings from the environment and the TOML configuration file
// 2. Initialize logging and the runtime
// 3. Wire the iproute2, Ookla and Ambient adapters into a `MeasurementRun`
// 4. Run it once and exit
//
// All measurement logic lives in speedtest-ambient-core; this file only
// wires things together.
//
// ## Environment
//
// - `SPEEDTEST_AMBIENT_CONFIG`: Configuration file
//   (default `$HOME/.config/speedtest-ambient.toml`)
// - `SPEEDTEST_AMBIENT_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `SPEEDTEST_AMBIENT_MODE`: `dry-run` measures but does not upload
//
// ## Example
//
// ```bash
// SPEEDTEST_AMBIENT_MODE=dry-run SPEEDTEST_AMBIENT_LOG_LEVEL=debug speedtest-ambient
// ```

use anyhow::Result;
use speedtest_ambient_core::{AppConfig, MeasurementRun, RunSummary};
use speedtest_ambient_iproute2::IpRoute2;
use speedtest_ambient_ookla::OoklaSpeedTester;
use speedtest_ambient_reporter::AmbientReporter;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Environment variable selecting the log level
const LOG_LEVEL_ENV: &str = "SPEEDTEST_AMBIENT_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Every routable address was measured and reported
/// - 1: Configuration or startup error
/// - 2: Runtime error (discovery, routing, measurement, reporting)
#[derive(Debug, Clone, Copy)]
enum RunExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The run itself failed
    RuntimeError = 2,
}

impl From<RunExitCode> for ExitCode {
    fn from(code: RunExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Settings taken from the environment
struct Settings {
    log_level: Level,
}

impl Settings {
    /// Read and validate settings from environment variables
    fn from_env() -> Result<Self> {
        let raw = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());

        let log_level = match raw.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "{} '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                LOG_LEVEL_ENV,
                raw
            ),
        };

        Ok(Self { log_level })
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RunExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RunExitCode::ConfigError.into();
    }

    let config = match AppConfig::default_path().and_then(|path| AppConfig::load(&path)) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return RunExitCode::ConfigError.into();
        }
    };

    let run = match build_run(&config) {
        Ok(run) => run,
        Err(e) => {
            error!("Startup failed: {}", e);
            return RunExitCode::ConfigError.into();
        }
    };

    // Steps are awaited one after another, a single thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RunExitCode::ConfigError.into();
        }
    };

    match rt.block_on(run.run()) {
        Ok(summary) => {
            log_summary(&summary);
            RunExitCode::Success.into()
        }
        Err(e) => {
            error!("Run failed: {}", e);
            RunExitCode::RuntimeError.into()
        }
    }
}

/// Wire the adapters into a measurement run
fn build_run(config: &AppConfig) -> Result<MeasurementRun> {
    let ip = IpRoute2::new();
    let speed_tester = OoklaSpeedTester::from_config(&config.speedtest);
    let reporter = AmbientReporter::from_config(&config.ambient)?;

    let run = MeasurementRun::new(
        Box::new(ip.clone()),
        Box::new(ip),
        Box::new(speed_tester),
        Box::new(reporter),
        &config.ambient,
    )?;
    Ok(run)
}

fn log_summary(summary: &RunSummary) {
    for reported in &summary.reported {
        info!(
            "{} -> channel {}: down {:.2} Mbps, up {:.2} Mbps",
            reported.address,
            reported.channel_id,
            reported.result.download_mbps(),
            reported.result.upload_mbps()
        );
    }
    info!(
        "Run complete: {} measurement(s) reported, {} channel(s) unused",
        summary.reported.len(),
        summary.unused_channels
    );
}
