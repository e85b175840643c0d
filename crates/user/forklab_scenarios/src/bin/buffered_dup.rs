//! Duplicates with output still sitting in the buffer.
//!
//! The copy inherits the unflushed `parent` line, so both units write it,
//! each followed by its own `child` line.

use forklab_scenarios::{OrExit as _, exit_err};
use forklab_user_lib::{
    buf_append,
    io::{self, OutputBuffer},
    log, process,
};

fn main() {
    log::init();

    let mut buf = OutputBuffer::new();
    buf_append!(buf, "parent {}\n", process::id())
        .or_exit(|e| exit_err!(e, "cannot format output"));

    let dup = process::duplicate().or_exit(|e| exit_err!(e, "cannot duplicate"));

    buf_append!(buf, "child {}\n", process::id())
        .or_exit(|e| exit_err!(e, "cannot format output"));
    buf.flush(&mut io::raw_stdout())
        .or_exit(|e| exit_err!(e, "cannot write output"));

    forklab_scenarios::finish(dup);
}
