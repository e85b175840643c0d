#![no_std]

use core::time::Duration;

/// Capacity of a unit's output buffer, in bytes.
pub const OUTPUT_BUF_SIZE: usize = 128;

/// Capacity of a unit's input accumulator, in bytes.
///
/// One byte short of the output buffer, leaving room for the newline added
/// when the accumulated input is echoed.
pub const INPUT_BUF_SIZE: usize = OUTPUT_BUF_SIZE - 1;

/// Iterations each worker runs before returning.
pub const WORKER_ITERATIONS: usize = 2;

/// Pause between two worker iterations.
pub const WORKER_PAUSE: Duration = Duration::from_micros(100);

/// Pause after duplication that gives surviving workers a chance to run.
pub const SETTLE_PAUSE: Duration = Duration::from_micros(1000);

/// Read attempts made by the incremental reader.
pub const READ_ATTEMPTS: usize = 3;

/// Bytes requested per read attempt.
pub const READ_UNIT_SIZE: usize = 1;

/// Pause between two read attempts.
pub const READ_PAUSE: Duration = Duration::from_micros(100);

/// How long the lock holder keeps the lock per round.
pub const LOCK_HOLD: Duration = Duration::from_millis(100);

/// How long the lock holder stays away from the lock per round.
pub const LOCK_RELEASE: Duration = Duration::from_millis(900);

/// Delay between starting the lock holder and duplicating, chosen to land
/// inside the holder's first hold period.
pub const LOCK_PROBE_DELAY: Duration = Duration::from_millis(50);

/// How long a unit waits for the lock before declaring it stuck.
pub const LOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(2);

// The accumulator must be able to hold a full default read sequence.
const _: () = assert!(READ_ATTEMPTS * READ_UNIT_SIZE <= INPUT_BUF_SIZE);
