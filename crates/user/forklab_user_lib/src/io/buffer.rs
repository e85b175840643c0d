use std::{
    fmt,
    io::{self, Write},
};

use arrayvec::ArrayVec;
use forklab_params::OUTPUT_BUF_SIZE;

use crate::error::ForklabError;

/// A bounded, explicitly flushed output buffer.
///
/// The buffer lives in the memory of the unit that owns it. Duplicating the
/// unit duplicates the buffer together with its cursor, so content that was
/// not flushed before the duplication is flushed once by each copy.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    buf: ArrayVec<u8, OUTPUT_BUF_SIZE>,
}

impl OutputBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: ArrayVec::new_const(),
        }
    }

    /// Appends formatted text at the cursor.
    ///
    /// On overflow the buffer is left exactly as it was.
    pub fn append(&mut self, args: fmt::Arguments<'_>) -> Result<(), ForklabError> {
        let start = self.buf.len();
        if fmt::Write::write_fmt(self, args).is_err() {
            self.buf.truncate(start);
            return Err(ForklabError::BufferFull);
        }
        Ok(())
    }

    /// Appends raw bytes at the cursor.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), ForklabError> {
        self.buf
            .try_extend_from_slice(bytes)
            .map_err(|_| ForklabError::BufferFull)
    }

    /// Writes everything between the start and the cursor to `out`.
    ///
    /// Short writes are continued until every byte is accepted. The buffer
    /// itself is not modified; call [`reset`](Self::reset) to discard the
    /// flushed content.
    ///
    /// Workers flush through here, so this never emits `tracing` events.
    pub fn flush<W>(&self, out: &mut W) -> Result<usize, ForklabError>
    where
        W: Write + ?Sized,
    {
        let mut rest = self.buf.as_slice();
        let mut written = 0;
        while !rest.is_empty() {
            match out.write(rest) {
                Ok(0) => return Err(ForklabError::WriteZero { written }),
                Ok(n) => {
                    written += n;
                    rest = &rest[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(written)
    }

    /// Moves the cursor back to the start.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.buf.remaining_capacity()
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf
            .try_extend_from_slice(s.as_bytes())
            .map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts at most `chunk` bytes per call.
    struct Trickle {
        out: Vec<u8>,
        chunk: usize,
        calls: usize,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(self.chunk);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn append_flush_reset() {
        let mut buf = OutputBuffer::new();
        buf_append!(buf, "parent {}\n", 10).unwrap();
        assert_eq!(buf.as_bytes(), b"parent 10\n");

        let mut out = Vec::new();
        assert_eq!(buf.flush(&mut out).unwrap(), 10);
        buf.reset();
        assert!(buf.is_empty());

        buf_append!(buf, "child {}\n", 11).unwrap();
        buf.flush(&mut out).unwrap();
        assert_eq!(out, b"parent 10\nchild 11\n");
    }

    #[test]
    fn flush_without_reset_repeats_content() {
        let mut buf = OutputBuffer::new();
        buf_append!(buf, "parent 1\n").unwrap();
        let snapshot = buf.clone();

        buf_append!(buf, "child 1\n").unwrap();
        let mut copy = snapshot;
        buf_append!(copy, "child 2\n").unwrap();

        let mut out = Vec::new();
        buf.flush(&mut out).unwrap();
        copy.flush(&mut out).unwrap();
        assert_eq!(out, b"parent 1\nchild 1\nparent 1\nchild 2\n");
    }

    #[test]
    fn overflow_leaves_buffer_untouched() {
        let mut buf = OutputBuffer::new();
        buf_append!(buf, "head\n").unwrap();
        let long = "x".repeat(OUTPUT_BUF_SIZE);
        assert!(matches!(
            buf_append!(buf, "{long}"),
            Err(ForklabError::BufferFull)
        ));
        assert!(matches!(
            buf.append_bytes(long.as_bytes()),
            Err(ForklabError::BufferFull)
        ));
        assert_eq!(buf.as_bytes(), b"head\n");
        assert_eq!(buf.remaining_capacity(), OUTPUT_BUF_SIZE - 5);
    }

    #[test]
    fn flush_continues_short_writes() {
        let mut buf = OutputBuffer::new();
        buf_append!(buf, "b 1234\n").unwrap();
        let mut out = Trickle {
            out: Vec::new(),
            chunk: 2,
            calls: 0,
        };
        assert_eq!(buf.flush(&mut out).unwrap(), 7);
        assert_eq!(out.out, b"b 1234\n");
    }

    #[test]
    fn flush_to_closed_channel_fails() {
        let mut buf = OutputBuffer::new();
        buf_append!(buf, "a\n").unwrap();
        assert!(matches!(
            buf.flush(&mut Closed),
            Err(ForklabError::WriteZero { written: 0 })
        ));
    }

    #[test]
    fn flush_empty_writes_nothing() {
        let buf = OutputBuffer::new();
        assert_eq!(buf.flush(&mut Closed).unwrap(), 0);
    }
}
