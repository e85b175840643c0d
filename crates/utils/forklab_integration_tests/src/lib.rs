//! Host-side harness for the scenario programs.
//!
//! A [`Runner`] launches one scenario binary with piped stdio, and the
//! helpers in [`monitor`] feed it input, wait for it under a timeout and
//! hand back everything it wrote to stdout. [`output`] turns that stdout
//! into typed lines so tests can reason about multisets of lines instead of
//! a fixed order.

pub use self::runner::Runner;

pub mod helper;
pub mod logged_command;
pub mod monitor;
pub mod output;
mod runner;

/// Creates a [`Runner`] for the named binary of the calling package.
///
/// Must be invoked from an integration test, where cargo provides both the
/// binary path and a scratch directory.
#[macro_export]
macro_rules! runner {
    ($bin:literal, $name:expr) => {
        $crate::Runner::new(
            ::std::path::Path::new(env!(concat!("CARGO_BIN_EXE_", $bin))),
            ::std::path::Path::new(env!("CARGO_TARGET_TMPDIR")),
            module_path!(),
            $name,
        )
    };
}
