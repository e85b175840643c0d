//! Reads a few bytes of stdin one small request at a time.
//!
//! Both units read the same stdin, so how the bytes split between them is
//! up to the scheduler. `-S` skips the duplication.

use std::env;

use forklab_scenarios::{OrExit as _, exit_err, parse_count, usage_and_exit};
use forklab_user_lib::{
    buf_append,
    io::{self, InputAccumulator, OutputBuffer},
    log,
    params::{READ_ATTEMPTS, READ_PAUSE, READ_UNIT_SIZE},
    process,
};

const USAGE: &str = "[-S] [-n attempts] [-s unit_size]";

fn main() {
    log::init();

    let mut single = false;
    let mut attempts = READ_ATTEMPTS;
    let mut unit_size = READ_UNIT_SIZE;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-S" => single = true,
            "-n" => attempts = parse_count("-n", args.next(), USAGE),
            "-s" => unit_size = parse_count("-s", args.next(), USAGE),
            _ => usage_and_exit!("{USAGE}"),
        }
    }

    let dup = (!single)
        .then(process::duplicate)
        .transpose()
        .or_exit(|e| exit_err!(e, "cannot duplicate"));

    let mut input = InputAccumulator::new();
    let total = input
        .accumulate(&mut io::raw_stdin(), attempts, unit_size, READ_PAUSE)
        .or_exit(|e| exit_err!(e, "cannot read stdin"));
    tracing::debug!(total, attempts, unit_size, "input accumulated");

    let mut out = OutputBuffer::new();
    out.append_bytes(input.as_bytes())
        .and_then(|()| buf_append!(out, "\n"))
        .or_exit(|e| exit_err!(e, "cannot format output"));
    out.flush(&mut io::raw_stdout())
        .or_exit(|e| exit_err!(e, "cannot write output"));

    if let Some(dup) = dup {
        forklab_scenarios::finish(dup);
    }
}
