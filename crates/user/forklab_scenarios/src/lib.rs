//! Shared plumbing of the scenario programs.
//!
//! Each program under `src/bin` demonstrates one interaction between process
//! duplication and the state a unit owns at that moment. Scenario output
//! goes to stdout through raw writes; diagnostics go to stderr.

use std::{convert::Infallible, fmt};

use forklab_user_lib::{
    io::{self, OutputBuffer},
    process::{self, DuplicationResult},
};

#[macro_export]
macro_rules! message {
    ($($msg:tt)*) => {
        {
            let prog = ::forklab_user_lib::env::arg0();
            ::std::eprintln!("{prog}: {msg}", msg = ::core::format_args!($($msg)*));
        }
    }
}

#[macro_export]
macro_rules! message_err {
    ($e:expr) => {
        {
            let prog = ::forklab_user_lib::env::arg0();
            ::std::eprintln!("{prog}: {e}", e = $e);
        }
    };
    ($e:expr, $($msg:tt)*) => {
        {
            let prog = ::forklab_user_lib::env::arg0();
            ::std::eprintln!("{prog}: {msg}: {e}", msg = ::core::format_args!($($msg)*), e = $e);
        }
    };
}

#[macro_export]
macro_rules! exit_err {
    ($e:expr, $($msg:tt)*) => {
        {
            $crate::message_err!($e, $($msg)*);
            ::forklab_user_lib::process::exit(1);
        }
    }
}

#[macro_export]
macro_rules! usage_and_exit {
    ($($args:tt)*) => {
        {
            let prog = ::forklab_user_lib::env::arg0();
            ::std::eprintln!("Usage: {prog} {args}", args = ::core::format_args!($($args)*));
            ::forklab_user_lib::process::exit(1);
        }
    };
}

/// Writes formatted text to stdout in a single raw write.
#[macro_export]
macro_rules! emit {
    ($($arg:tt)*) => {
        $crate::emit_fmt(::core::format_args!($($arg)*))
    };
}

pub trait OrExit<T, E> {
    fn or_exit<F>(self, exit: F) -> T
    where
        F: FnOnce(E) -> Infallible;
}

impl<T, E> OrExit<T, E> for Result<T, E> {
    #[track_caller]
    fn or_exit<F>(self, exit: F) -> T
    where
        F: FnOnce(E) -> Infallible,
    {
        match self {
            Ok(val) => val,
            Err(e) => match exit(e) {},
        }
    }
}

/// Parses the value following a flag as a number, or prints usage and exits.
pub fn parse_count(flag: &str, value: Option<String>, usage: &str) -> usize {
    let Some(value) = value else {
        message!("missing argument for {flag}");
        usage_and_exit!("{usage}");
    };
    value
        .parse()
        .or_exit(|e| exit_err!(e, "invalid argument for {flag}: {value:?}"))
}

#[doc(hidden)]
pub fn emit_fmt(args: fmt::Arguments<'_>) {
    let mut line = OutputBuffer::new();
    line.append(args)
        .or_exit(|e| exit_err!(e, "cannot format output"));
    let written = line
        .flush(&mut io::raw_stdout())
        .or_exit(|e| exit_err!(e, "cannot write output"));
    tracing::trace!(written, "output flushed");
}

/// Ends the scenario for the unit it runs in.
///
/// The copy exits with status 0 right away. The original waits for the copy
/// and exits with status 1 if the copy did not succeed.
pub fn finish(dup: DuplicationResult) {
    let Some(mut child) = dup.into_original() else {
        process::exit(0);
    };
    let pid = child.id();
    let status = child
        .wait()
        .or_exit(|e| exit_err!(e, "cannot wait for copy {pid}"));
    if !status.success() {
        message!("copy {pid} exited with status {}", status.code());
        process::exit(1);
    }
}
