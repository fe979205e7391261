//! External command invocation
//!
//! Every external tool is run to completion with its output captured. There
//! is no timeout: a hanging tool blocks the run.

use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Captured output of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args` and wait for it to exit
///
/// # Returns
///
/// - `Ok(CommandOutput)`: The command exited with status 0
/// - `Err(Error::Command)`: The command could not be started or exited
///   unsuccessfully; the error carries the exit status and stderr
pub async fn run_command<I, S>(program: &str, args: I) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let args: Vec<std::ffi::OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    debug!("Running {} {:?}", program, args);

    let output = Command::new(program)
        .args(&args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::command(program, None, format!("failed to start: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::command(program, output.status.code(), stderr.trim()));
    }

    Ok(CommandOutput { stdout, stderr })
}
