//! User-space view of execution units.
//!
//! Process duplication, worker threads that share their creator's memory,
//! explicitly flushed output buffers and incremental input reads, each
//! built directly on the corresponding system call so their behavior across
//! a `fork(2)` stays observable.

pub use forklab_params as params;

#[macro_use]
mod macros;

pub mod env;
pub mod error;
pub mod io;
pub mod log;
pub mod process;
pub mod thread;
