use std::io;

use forklab_types::process::InvalidProcId;
use nix::errno::Errno;

#[derive(Debug, thiserror::Error)]
pub enum ForklabError {
    #[error("cannot duplicate execution unit: {0}")]
    DuplicationFailed(#[source] Errno),
    #[error("cannot wait for child process: {0}")]
    WaitFailed(#[source] Errno),
    #[error(transparent)]
    InvalidProcId(#[from] InvalidProcId),
    #[error("output buffer is full")]
    BufferFull,
    #[error("failed to write the buffered data ({written} bytes written)")]
    WriteZero { written: usize },
    #[error("cannot spawn worker thread: {0}")]
    WorkerSpawn(#[source] io::Error),
    #[error("worker thread panicked")]
    WorkerPanicked,
    #[error("input/output error: {0}")]
    Io(#[from] io::Error),
}

impl ForklabError {
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::DuplicationFailed(e) | Self::WaitFailed(e) => *e == Errno::EINTR,
            Self::Io(e) => e.kind() == io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}
