//! Test runner for integration tests.
//!
//! This module provides the `Runner` struct, which prepares a per-test
//! workspace and launches one scenario binary in it.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::Context as _;
use tokio::{fs, process::Command};

use crate::logged_command::LoggedCommand;

/// A global atomic counter for assigning unique runner IDs.
static RUNNER_ID: AtomicUsize = AtomicUsize::new(0);

/// Represents a test runner for integration tests.
pub struct Runner {
    /// The unique ID of the runner.
    id: usize,
    /// The scenario binary to launch.
    program: PathBuf,
    /// Arguments passed to the scenario binary.
    args: Vec<OsString>,
    /// Extra environment variables for the scenario binary.
    envs: Vec<(OsString, OsString)>,
    /// The workspace directory for the test.
    workspace_dir: PathBuf,
}

impl Runner {
    /// Creates a new `Runner` instance.
    ///
    /// The workspace directory is derived from `tmp_dir`, the module path
    /// and the test name, and created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace directory cannot be created.
    pub async fn new(
        program: &Path,
        tmp_dir: &Path,
        module_path: &str,
        fn_name: &str,
    ) -> Result<Self, anyhow::Error> {
        let id = RUNNER_ID.fetch_add(1, Ordering::Relaxed);

        let mut workspace_dir = tmp_dir.join("forklab");
        for component in module_path.split("::") {
            workspace_dir.push(component);
        }
        workspace_dir.push(fn_name);

        fs::create_dir_all(&workspace_dir)
            .await
            .context("create workspace failed")?;

        Ok(Self {
            id,
            program: program.to_owned(),
            args: vec![],
            envs: vec![],
            workspace_dir,
        })
    }

    /// Adds an argument for the scenario binary.
    #[must_use]
    pub fn arg<S>(mut self, arg: S) -> Self
    where
        S: Into<OsString>,
    {
        self.args.push(arg.into());
        self
    }

    /// Sets an environment variable for the scenario binary.
    #[must_use]
    pub fn env<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Launches the scenario binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary cannot be spawned.
    pub fn launch(self) -> Result<LoggedCommand, anyhow::Error> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .current_dir(&self.workspace_dir);

        let name = self
            .program
            .file_name()
            .map_or_else(|| "scenario".into(), |s| s.to_string_lossy());

        LoggedCommand::new(command, self.id, &name, &self.workspace_dir)
            .with_context(|| format!("spawn {} failed", self.program.display()))
    }
}
