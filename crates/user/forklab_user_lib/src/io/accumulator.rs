use std::{
    io::{self, Read},
    time::Duration,
};

use arrayvec::ArrayVec;
use forklab_params::INPUT_BUF_SIZE;

use crate::{error::ForklabError, thread};

/// A fixed-capacity buffer filled by repeated small reads.
///
/// The length of the accumulated content is the cursor. It never exceeds
/// [`INPUT_BUF_SIZE`], and a read that returns fewer bytes than requested
/// (down to zero at end of input) simply advances it less.
#[derive(Debug, Clone, Default)]
pub struct InputAccumulator {
    buf: ArrayVec<u8, INPUT_BUF_SIZE>,
}

impl InputAccumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: ArrayVec::new_const(),
        }
    }

    /// Makes `attempts` reads of up to `unit_size` bytes each from `source`.
    ///
    /// Units sleep for `pause` between two attempts. Requests are clamped to
    /// the remaining capacity, an interrupted read is retried within the
    /// same attempt, and any other read error is returned as is.
    ///
    /// Returns the total number of bytes accumulated so far.
    pub fn accumulate<R>(
        &mut self,
        source: &mut R,
        attempts: usize,
        unit_size: usize,
        pause: Duration,
    ) -> Result<usize, ForklabError>
    where
        R: Read + ?Sized,
    {
        let mut chunk = [0; INPUT_BUF_SIZE];
        for attempt in 0..attempts {
            if attempt > 0 {
                thread::sleep(pause);
            }

            let want = unit_size.min(self.buf.remaining_capacity());
            let n = loop {
                match source.read(&mut chunk[..want]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e.into()),
                }
            };
            if n < want {
                tracing::debug!(attempt, want, got = n, "short read");
            }
            self.buf
                .try_extend_from_slice(&chunk[..n])
                .map_err(|_| ForklabError::BufferFull)?;
        }
        Ok(self.buf.len())
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
    pub fn is_full(&self) -> bool {
        self.buf.is_full()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Hands out at most one queued chunk per read.
    struct Chunked {
        chunks: VecDeque<Vec<u8>>,
        reads: usize,
    }

    impl Chunked {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                reads: 0,
            }
        }
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let Some(mut chunk) = self.chunks.pop_front() else {
                return Ok(0);
            };
            if chunk.is_empty() {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                chunk.drain(..n);
                self.chunks.push_front(chunk);
            }
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn reads_one_unit_per_attempt() {
        let mut src = &b"hello"[..];
        let mut acc = InputAccumulator::new();
        let total = acc.accumulate(&mut src, 3, 1, Duration::ZERO).unwrap();
        assert_eq!(total, 3);
        assert_eq!(acc.as_bytes(), b"hel");
        assert_eq!(src, b"lo");
    }

    #[test]
    fn exhausted_source_is_not_an_error() {
        let mut src = &b"hi"[..];
        let mut acc = InputAccumulator::new();
        let total = acc.accumulate(&mut src, 3, 1, Duration::ZERO).unwrap();
        assert_eq!(total, 2);
        assert_eq!(acc.as_bytes(), b"hi");

        let mut empty = &b""[..];
        let mut acc = InputAccumulator::new();
        assert_eq!(acc.accumulate(&mut empty, 3, 1, Duration::ZERO).unwrap(), 0);
        assert!(acc.is_empty());
    }

    #[test]
    fn short_reads_advance_by_actual_count() {
        let mut src = Chunked::new(&[b"a", b"bc", b"d"]);
        let mut acc = InputAccumulator::new();
        let total = acc.accumulate(&mut src, 3, 4, Duration::ZERO).unwrap();
        assert_eq!(total, 4);
        assert_eq!(acc.as_bytes(), b"abcd");
        assert_eq!(src.reads, 3);
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut src = Chunked::new(&[b"x", b"", b"y"]);
        let mut acc = InputAccumulator::new();
        acc.accumulate(&mut src, 2, 1, Duration::ZERO).unwrap();
        assert_eq!(acc.as_bytes(), b"xy");
        assert_eq!(src.reads, 3);
    }

    #[test]
    fn requests_are_clamped_to_capacity() {
        let data = vec![b'z'; INPUT_BUF_SIZE + 10];
        let mut src = &data[..];
        let mut acc = InputAccumulator::new();
        let total = acc
            .accumulate(&mut src, 2, INPUT_BUF_SIZE - 1, Duration::ZERO)
            .unwrap();
        assert_eq!(total, INPUT_BUF_SIZE);
        assert!(acc.is_full());
        assert_eq!(src.len(), 10);
    }

    #[test]
    fn read_error_propagates() {
        let mut acc = InputAccumulator::new();
        let err = acc
            .accumulate(&mut Broken, 3, 1, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, ForklabError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
