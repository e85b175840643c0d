//! Duplicates a process that owns a mutex.
//!
//! The lock word is copied like any other memory. Without `-H` the lock is
//! free at the time of duplication and both units take it. With `-H` a
//! holder thread keeps re-taking the lock; if it holds the lock when the
//! process duplicates, the copy inherits a locked mutex whose owner does
//! not exist there and reports it as stuck after a timeout.

use std::env;

use forklab_scenarios::{OrExit as _, emit, exit_err, usage_and_exit};
use forklab_user_lib::{
    log,
    params::{LOCK_HOLD, LOCK_PROBE_DELAY, LOCK_RELEASE, LOCK_WAIT_TIMEOUT},
    process, thread,
};
use parking_lot::{Mutex, const_mutex};

static LOCK: Mutex<()> = const_mutex(());

fn main() {
    log::init();

    let mut hold = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-H" => hold = true,
            _ => usage_and_exit!("[-H]"),
        }
    }

    if hold {
        let _holder = thread::spawn_worker("holder", |_| {
            loop {
                {
                    let _guard = LOCK.lock();
                    thread::sleep(LOCK_HOLD);
                }
                thread::sleep(LOCK_RELEASE);
            }
        })
        .or_exit(|e| exit_err!(e, "cannot start lock holder"));
        thread::sleep(LOCK_PROBE_DELAY);
    } else {
        let _guard = LOCK.lock();
        thread::sleep(LOCK_HOLD);
    }

    emit!("about to duplicate, locked={}\n", LOCK.is_locked());
    let dup = process::duplicate().or_exit(|e| exit_err!(e, "cannot duplicate"));

    if let Some(_guard) = LOCK.try_lock_for(LOCK_WAIT_TIMEOUT) {
        emit!("got lock {}\n", process::id());
    } else {
        tracing::warn!(timeout = ?LOCK_WAIT_TIMEOUT, "lock never released");
        emit!("lock stuck {}\n", process::id());
    }

    forklab_scenarios::finish(dup);
}
