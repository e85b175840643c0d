//! Driving a launched scenario to completion.

use std::process::ExitStatus;

use anyhow::Context as _;
use tokio::time::{self, Duration};

use crate::{Runner, logged_command::LoggedCommand};

/// Runs a scenario under a timeout.
///
/// `f` gets the running command to feed input or watch output; whatever it
/// returns is handed back with the exit status and the full stdout once the
/// scenario's stdout is closed, i.e. once every unit holding it has exited.
///
/// # Errors
///
/// Returns an error if the test times out or if any part of the test fails.
pub async fn run_test<F, T>(
    r: Runner,
    timeout: Duration,
    f: F,
) -> Result<(ExitStatus, String, T), anyhow::Error>
where
    F: AsyncFnOnce(&mut LoggedCommand) -> Result<T, anyhow::Error>,
{
    time::timeout(timeout, async {
        let mut command = r.launch()?;
        let ret = f(&mut command).await?;
        let (exit_status, stdout) = command.wait_terminate().await?;
        Ok((exit_status, stdout, ret))
    })
    .await
    .context("test timeout")?
}

/// Sends `input` to the scenario's stdin and closes it.
///
/// # Errors
///
/// Returns an error if stdin is already closed.
pub async fn feed_input(command: &mut LoggedCommand, input: &[u8]) -> Result<(), anyhow::Error> {
    if !input.is_empty() {
        command.send_input(input).await?;
    }
    command.close_stdin();
    Ok(())
}
