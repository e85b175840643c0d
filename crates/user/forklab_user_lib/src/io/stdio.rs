use std::io::{self, Read, Write};

use nix::unistd;

/// Unbuffered standard output.
///
/// Every `write` is exactly one `write(2)` on file descriptor 1. Unlike
/// [`std::io::Stdout`] there is no process-wide lock and no hidden buffer,
/// so nothing about it can be half-owned by a thread that does not survive
/// duplication.
#[derive(Debug)]
pub struct RawStdout {}

impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(unistd::write(io::stdout(), buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Unbuffered standard input.
///
/// Every `read` is exactly one `read(2)` on file descriptor 0, so a unit
/// asking for one byte consumes at most one byte of the shared source.
#[derive(Debug)]
pub struct RawStdin {}

impl Read for RawStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(unistd::read(io::stdin(), buf)?)
    }
}

#[must_use]
pub fn raw_stdout() -> RawStdout {
    RawStdout {}
}

#[must_use]
pub fn raw_stdin() -> RawStdin {
    RawStdin {}
}
