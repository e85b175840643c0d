//! Utilities for managing and logging subprocess commands.
//!
//! This module provides the `LoggedCommand` struct, which wraps a subprocess
//! and handles its input/output streams, logging, and lifecycle management.

use std::{
    fs::File,
    io::Write as _,
    num::NonZero,
    path::Path,
    process::{self, ExitStatus, Stdio},
    str,
    sync::{Arc, Mutex},
};

use anyhow::Context as _;
use forklab_types::process::ProcId;
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    process::{Child, ChildStderr, ChildStdin, ChildStdout, Command},
    sync::mpsc,
    task::JoinHandle,
};

/// A struct for managing and logging subprocess commands.
///
/// Stdout is captured in full and mirrored to the log file; stderr only
/// goes to the log file and to the test's own stderr.
pub struct LoggedCommand {
    /// The child process being managed.
    proc: Child,
    /// Process ID of the child, taken right after spawning.
    pid: ProcId,
    /// Handle for managing the stdin task.
    stdin_handle: JoinHandle<Result<(), anyhow::Error>>,
    /// Handle for managing the stdout task.
    stdout_handle: JoinHandle<Result<(), anyhow::Error>>,
    /// Handle for managing the stderr task.
    stderr_handle: JoinHandle<Result<(), anyhow::Error>>,
    /// Sender for writing to the child process's stdin.
    stdin_tx: Option<mpsc::Sender<Vec<u8>>>,
    /// Buffer for storing the child process's stdout content.
    stdout_content: Arc<Mutex<String>>,
}

impl LoggedCommand {
    /// Creates a new `LoggedCommand` instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the subprocess cannot be spawned or if the log
    /// file cannot be created.
    pub fn new(
        mut command: Command,
        runner_id: usize,
        command_name: &str,
        workspace_dir: &Path,
    ) -> Result<Self, anyhow::Error> {
        let log_path = workspace_dir.join(format!(
            "forklab.{}.{}.{}.out",
            process::id(),
            runner_id,
            command_name
        ));
        let log = Arc::new(Mutex::new(
            File::create(&log_path).context("open logfile failed")?,
        ));

        let mut proc = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("spawn command failed")?;

        let pid = proc
            .id()
            .and_then(NonZero::new)
            .map(ProcId::new)
            .context("spawned command has no process id")?;

        let stdin = proc.stdin.take().context("stdin is not piped")?;
        let stdout = proc.stdout.take().context("stdout is not piped")?;
        let stderr = proc.stderr.take().context("stderr is not piped")?;

        let (stdin_tx, stdin_rx) = mpsc::channel(1);
        let stdin_handle = tokio::spawn(handle_stdin(stdin, stdin_rx));

        let stdout_content = Arc::new(Mutex::new(String::new()));

        let stdout_handle = tokio::spawn(handle_stdout(
            Arc::clone(&log),
            stdout,
            Arc::clone(&stdout_content),
        ));

        let stderr_handle = tokio::spawn(handle_stderr(log, stderr));

        Ok(Self {
            proc,
            pid,
            stdin_handle,
            stdout_handle,
            stderr_handle,
            stdin_tx: Some(stdin_tx),
            stdout_content,
        })
    }

    /// Returns the process ID of the launched scenario, its original unit.
    #[must_use]
    pub fn id(&self) -> ProcId {
        self.pid
    }

    /// Sends bytes to the subprocess's stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin has already been closed.
    pub async fn send_input(&self, input: &[u8]) -> Result<(), anyhow::Error> {
        self.stdin_tx
            .as_ref()
            .context("stdin channel is closed")?
            .send(input.to_vec())
            .await
            .context("send stdin failed")?;
        Ok(())
    }

    /// Closes the stdin channel; the subprocess sees end of input once
    /// everything already sent has been written.
    pub fn close_stdin(&mut self) {
        let _ = self.stdin_tx.take();
    }

    /// Returns a reference to the stdout content buffer.
    #[must_use]
    pub fn stdout(&self) -> &Arc<Mutex<String>> {
        &self.stdout_content
    }

    /// Waits for the subprocess to terminate and collects its output.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the stream tasks fail or if the process
    /// cannot be awaited.
    pub async fn wait_terminate(mut self) -> Result<(ExitStatus, String), anyhow::Error> {
        drop(self.stdin_tx);
        self.stdin_handle
            .await
            .context("stdin handle join failed")??;
        self.stdout_handle
            .await
            .context("stdout handle join failed")??;
        self.stderr_handle
            .await
            .context("stderr handle join failed")??;
        let status = self.proc.wait().await?;
        let stdout = self.stdout_content.lock().unwrap().clone();
        Ok((status, stdout))
    }
}

async fn handle_stdin(
    mut stdin: ChildStdin,
    mut rx: mpsc::Receiver<Vec<u8>>,
) -> Result<(), anyhow::Error> {
    while let Some(msg) = rx.recv().await {
        stdin.write_all(&msg).await?;
        stdin.flush().await?;
    }
    Ok(())
}

async fn handle_stdout(
    log: Arc<Mutex<File>>,
    mut stdout: ChildStdout,
    output: Arc<Mutex<String>>,
) -> Result<(), anyhow::Error> {
    let mut buf = vec![0; 4096];
    let mut pending = vec![];

    loop {
        let n = stdout
            .read(&mut buf)
            .await
            .context("read stdout failed")?;

        pending.extend_from_slice(&buf[..n]);
        let s = if n == 0 {
            let rest = String::from_utf8_lossy(&pending).into_owned();
            pending.clear();
            rest
        } else {
            take_decoded(&mut pending)
        };

        {
            let mut log = log.lock().unwrap();
            log.write_all(s.as_bytes())?;
            log.flush()?;
        }

        output.lock().unwrap().push_str(&s);

        if n == 0 {
            break;
        }
    }
    Ok(())
}

/// Removes and decodes the front of `pending` up to a trailing character
/// whose remaining bytes have not arrived yet.
///
/// Invalid sequences become U+FFFD.
fn take_decoded(pending: &mut Vec<u8>) -> String {
    let mut end = 0;
    let complete = loop {
        match str::from_utf8(&pending[end..]) {
            Ok(_) => break pending.len(),
            Err(e) => match e.error_len() {
                Some(len) => end += e.valid_up_to() + len,
                None => break end + e.valid_up_to(),
            },
        }
    };
    let s = String::from_utf8_lossy(&pending[..complete]).into_owned();
    pending.drain(..complete);
    s
}

async fn handle_stderr(
    log: Arc<Mutex<File>>,
    mut stderr: ChildStderr,
) -> Result<(), anyhow::Error> {
    let mut buf = vec![0; 4096];
    loop {
        let n = stderr
            .read(&mut buf)
            .await
            .context("read stderr failed")?;

        let buf = &buf[..n];

        {
            let mut stderr = std::io::stderr().lock();
            stderr.write_all(buf)?;
            stderr.flush()?;
        }

        {
            let mut log = log.lock().unwrap();
            log.write_all(buf)?;
            log.flush()?;
        }

        if n == 0 {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_character_waits_for_its_tail() {
        let bytes = "b\u{e9}\n".as_bytes();
        let mut pending = bytes[..2].to_vec();
        assert_eq!(take_decoded(&mut pending), "b");
        assert_eq!(pending, [0xc3]);

        pending.extend_from_slice(&bytes[2..]);
        assert_eq!(take_decoded(&mut pending), "\u{e9}\n");
        assert!(pending.is_empty());
    }

    #[test]
    fn invalid_bytes_do_not_hold_back_output() {
        let mut pending = b"a\xffb\xe2\x82".to_vec();
        assert_eq!(take_decoded(&mut pending), "a\u{fffd}b");
        assert_eq!(pending, [0xe2, 0x82]);

        pending.push(0xac);
        assert_eq!(take_decoded(&mut pending), "\u{20ac}");
    }
}
