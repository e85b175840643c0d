pub use forklab_types::process::{ExitStatus, ProcId};
use nix::{
    sys::wait::{self, WaitStatus},
    unistd::{self, ForkResult, Pid},
};

use crate::error::ForklabError;

/// Represents a copy created by [`duplicate`], seen from the original.
#[derive(Debug)]
pub struct Child {
    pid: ProcId,
}

impl Child {
    /// Returns the process ID of the copy.
    #[must_use]
    pub fn id(&self) -> ProcId {
        self.pid
    }

    /// Waits for the copy to exit and returns its exit status.
    pub fn wait(&mut self) -> Result<ExitStatus, ForklabError> {
        wait_pid(self.pid)
    }
}

/// What [`duplicate`] returns in each of the two resulting units.
///
/// Exactly one of the two units sees `Original`, carrying the identifier of
/// the other; the other sees `Copy`.
#[derive(Debug)]
pub enum DuplicationResult {
    Original { child: Child },
    Copy,
}

impl DuplicationResult {
    /// Converts the result into an `Option<Child>`, returning `Some(child)`
    /// in the original, or `None` in the copy.
    #[must_use]
    pub fn into_original(self) -> Option<Child> {
        match self {
            Self::Original { child } => Some(child),
            Self::Copy => None,
        }
    }

    #[must_use]
    pub fn is_original(&self) -> bool {
        matches!(self, Self::Original { .. })
    }

    #[must_use]
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }

    /// Identifier of the copy as seen from this unit, `0` in the copy itself.
    #[must_use]
    pub fn raw_child_id(&self) -> u32 {
        match self {
            Self::Original { child } => child.id().into(),
            Self::Copy => 0,
        }
    }

    /// Waits for the copy in the original; terminates the copy with status 0.
    pub fn join(self) -> Result<ExitStatus, ForklabError> {
        match self {
            Self::Original { mut child } => child.wait(),
            Self::Copy => exit(0),
        }
    }
}

/// Duplicates the calling unit.
///
/// Both units resume right after the call with identical but independent
/// memory: buffers, cursors and locals mutated afterwards by one unit are
/// never seen by the other. Only the calling thread exists in the copy.
pub fn duplicate() -> Result<DuplicationResult, ForklabError> {
    // SAFETY: the copy only runs code of this crate and std, none of which
    // depends on a lock another thread may hold at the time of the call,
    // apart from the allocator, which the C library keeps consistent across
    // `fork`.
    match unsafe { unistd::fork() } {
        Ok(ForkResult::Parent { child }) => {
            let pid = ProcId::try_from(child.as_raw())?;
            tracing::debug!(parent = %id(), child = %pid, "duplicated");
            Ok(DuplicationResult::Original {
                child: Child { pid },
            })
        }
        Ok(ForkResult::Child) => Ok(DuplicationResult::Copy),
        Err(e) => {
            tracing::error!(error = %e, "duplication failed");
            Err(ForklabError::DuplicationFailed(e))
        }
    }
}

/// Returns the process ID of the current process.
///
/// # Panics
///
/// Panics if the platform reports a non-positive process ID.
#[must_use]
pub fn id() -> ProcId {
    ProcId::try_from(unistd::getpid().as_raw()).unwrap()
}

/// Exits the current process with the specified status code.
///
/// Data sitting in std's stdout buffer is flushed on the way out unless the
/// stdout lock is held, which can only be the case in a copy whose
/// original had another thread printing at the moment of duplication.
pub fn exit(status: i32) -> ! {
    std::process::exit(status)
}

/// Waits for the specified child process to exit and returns its exit status.
pub fn wait_pid(pid: ProcId) -> Result<ExitStatus, ForklabError> {
    loop {
        let res = wait::waitpid(Pid::from_raw(pid.as_raw()), None)
            .map_err(ForklabError::WaitFailed);
        match res {
            Ok(WaitStatus::Exited(_, code)) => {
                tracing::debug!(child = %pid, code, "child exited");
                return Ok(ExitStatus::new(code));
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                tracing::debug!(child = %pid, ?signal, "child killed");
                return Ok(ExitStatus::KILLED);
            }
            Ok(_) => {}
            Err(e) if e.is_interrupted() => {}
            Err(e) => return Err(e),
        }
    }
}
