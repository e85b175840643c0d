//! Duplicates while two worker threads are running.
//!
//! Only the duplicating thread exists in the copy, so every worker line
//! carries the original's id. Workers are detached unless `-j` is given;
//! the original may then exit before their last iteration.

use std::env;

use forklab_scenarios::{OrExit as _, emit, exit_err, usage_and_exit};
use forklab_user_lib::{
    log,
    params::{SETTLE_PAUSE, WORKER_ITERATIONS, WORKER_PAUSE},
    process,
    thread,
};

const WORKER_TAGS: [&str; 2] = ["t1", "t2"];

fn main() {
    log::init();

    let mut join_workers = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-j" => join_workers = true,
            _ => usage_and_exit!("[-j]"),
        }
    }

    let workers = WORKER_TAGS.map(|tag| {
        thread::spawn_worker(tag, |tag| {
            thread::report_iterations(tag, WORKER_ITERATIONS, WORKER_PAUSE)
        })
        .or_exit(|e| exit_err!(e, "cannot start worker {tag}"))
    });

    emit!("a\n");
    let dup = process::duplicate().or_exit(|e| exit_err!(e, "cannot duplicate"));
    emit!("b {}\n", dup.raw_child_id());
    thread::sleep(SETTLE_PAUSE);

    if dup.is_copy() {
        // The handles name threads that only exist in the original.
        process::exit(0);
    }

    forklab_scenarios::finish(dup);

    if join_workers {
        for worker in workers {
            let tag = worker.tag();
            worker
                .join()
                .or_exit(|e| exit_err!(e, "worker {tag} failed"));
        }
    }
}
