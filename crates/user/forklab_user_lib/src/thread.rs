//! Worker units: threads that share their creator's address space.
//!
//! A duplication copies only the thread that calls it. Workers that exist
//! at that moment keep running in the original unit and are simply absent
//! from the copy.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{error::ForklabError, io, process};

/// Puts the current thread to sleep for the specified duration.
///
/// This is the cooperative pause used to make interleavings likely. It
/// orders nothing.
pub fn sleep(dur: Duration) {
    thread::sleep(dur);
}

/// Handle to a running worker.
///
/// Dropping the handle detaches the worker. A detached worker that is still
/// running when its process exits is stopped wherever it happens to be.
#[derive(Debug)]
pub struct WorkerHandle {
    tag: &'static str,
    inner: JoinHandle<Result<(), ForklabError>>,
}

impl WorkerHandle {
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Waits for the worker to return and hands back its result.
    pub fn join(self) -> Result<(), ForklabError> {
        let res = self.inner.join().map_err(|_| ForklabError::WorkerPanicked)?;
        tracing::debug!(tag = self.tag, ok = res.is_ok(), "worker joined");
        res
    }
}

/// Starts a worker running `entry(tag)`.
///
/// `entry` must not emit `tracing` events or touch std's locked stdio:
/// a lock the worker holds when its process duplicates stays held forever
/// in the copy.
pub fn spawn_worker<F>(tag: &'static str, entry: F) -> Result<WorkerHandle, ForklabError>
where
    F: FnOnce(&'static str) -> Result<(), ForklabError> + Send + 'static,
{
    let inner = thread::Builder::new()
        .name(format!("worker-{tag}"))
        .spawn(move || entry(tag))
        .map_err(ForklabError::WorkerSpawn)?;
    tracing::debug!(tag, "worker spawned");
    Ok(WorkerHandle { tag, inner })
}

/// Worker body reporting `"<id> <iteration> <tag>"` once per iteration.
///
/// Each line is one raw write to stdout, and the id is looked up at the
/// time of writing, so it always names the unit the worker runs in.
pub fn report_iterations(
    tag: &'static str,
    iterations: usize,
    pause: Duration,
) -> Result<(), ForklabError> {
    let mut stdout = io::raw_stdout();
    for i in 0..iterations {
        let mut line = io::OutputBuffer::new();
        buf_append!(line, "{} {i} {tag}\n", process::id())?;
        line.flush(&mut stdout)?;
        sleep(pause);
    }
    Ok(())
}
