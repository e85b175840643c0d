//! Flushes and resets the buffer before duplicating.
//!
//! The `parent` line reaches stdout once; each unit then starts from an
//! empty buffer and writes only its own `child` line.

use forklab_scenarios::{OrExit as _, exit_err};
use forklab_user_lib::{
    buf_append,
    io::{self, OutputBuffer},
    log, process,
};

fn main() {
    log::init();

    let mut stdout = io::raw_stdout();
    let mut buf = OutputBuffer::new();
    buf_append!(buf, "parent {}\n", process::id())
        .or_exit(|e| exit_err!(e, "cannot format output"));
    buf.flush(&mut stdout)
        .or_exit(|e| exit_err!(e, "cannot write output"));
    buf.reset();

    let dup = process::duplicate().or_exit(|e| exit_err!(e, "cannot duplicate"));

    buf_append!(buf, "child {}\n", process::id())
        .or_exit(|e| exit_err!(e, "cannot format output"));
    buf.flush(&mut stdout)
        .or_exit(|e| exit_err!(e, "cannot write output"));

    forklab_scenarios::finish(dup);
}
