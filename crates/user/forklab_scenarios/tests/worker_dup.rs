#![cfg(test)]

use std::time::Duration;

use forklab_integration_tests::{
    monitor,
    output::{self, Line},
    runner,
};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Checks the lines every run must satisfy and returns the worker lines.
fn check_lines(stdout: &str, original: u32) -> Vec<(u32, usize, String)> {
    let lines = output::parse(stdout);

    let before = lines
        .iter()
        .filter(|line| **line == Line::BeforeDuplicate)
        .count();
    assert_eq!(before, 1, "{stdout:?}");

    let mut after = lines
        .iter()
        .filter_map(|line| match line {
            Line::AfterDuplicate(id) => Some(*id),
            _ => None,
        })
        .collect::<Vec<_>>();
    after.sort_unstable();
    assert_eq!(after.len(), 2, "{stdout:?}");
    assert_eq!(after[0], 0, "the copy reports 0");
    assert_ne!(after[1], 0, "the original reports the copy's id");
    assert_ne!(after[1], original);

    let copy = after[1];
    let mut workers = vec![];
    for line in lines {
        match line {
            Line::Worker {
                pid,
                iteration,
                tag,
            } => {
                let pid = u32::from(pid);
                assert_ne!(pid, copy, "worker line from the copy: {stdout:?}");
                assert_eq!(pid, original);
                assert!(tag == "t1" || tag == "t2");
                workers.push((pid, iteration, tag));
            }
            Line::BeforeDuplicate | Line::AfterDuplicate(_) => {}
            other => panic!("unexpected line {other:?} in {stdout:?}"),
        }
    }
    workers
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn workers_only_run_in_original() -> Result<(), anyhow::Error> {
    for run in 0..5 {
        let r = runner!("worker_dup", &format!("workers_only_run_in_original_{run}")).await?;
        let (exit_status, stdout, original) =
            monitor::run_test(r, TIMEOUT, async |cmd| Ok(cmd.id())).await?;
        assert!(exit_status.success());
        let workers = check_lines(&stdout, original.into());
        assert!(workers.len() <= 4);
    }
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn joined_workers_finish_every_iteration() -> Result<(), anyhow::Error> {
    let r = runner!("worker_dup", "joined_workers_finish_every_iteration")
        .await?
        .arg("-j");
    let (exit_status, stdout, original) =
        monitor::run_test(r, TIMEOUT, async |cmd| Ok(cmd.id())).await?;
    assert!(exit_status.success());

    let mut workers = check_lines(&stdout, original.into())
        .into_iter()
        .map(|(_pid, iteration, tag)| (tag, iteration))
        .collect::<Vec<_>>();
    workers.sort_unstable();
    assert_eq!(
        workers,
        [
            ("t1".to_owned(), 0),
            ("t1".to_owned(), 1),
            ("t2".to_owned(), 0),
            ("t2".to_owned(), 1),
        ]
    );
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn trace_logging_keeps_copy_running() -> Result<(), anyhow::Error> {
    for run in 0..5 {
        let r = runner!("worker_dup", &format!("trace_logging_keeps_copy_running_{run}"))
            .await?
            .env("FORKLAB_LOG", "trace");
        let (exit_status, stdout, original) =
            monitor::run_test(r, TIMEOUT, async |cmd| Ok(cmd.id())).await?;
        assert!(exit_status.success());
        check_lines(&stdout, original.into());
    }
    Ok(())
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn unknown_argument_is_rejected() -> Result<(), anyhow::Error> {
    let r = runner!("worker_dup", "unknown_argument_is_rejected")
        .await?
        .arg("-x");
    let (exit_status, stdout, ()) = monitor::run_test(r, TIMEOUT, async |_cmd| Ok(())).await?;
    assert_eq!(exit_status.code(), Some(1));
    assert!(stdout.is_empty());
    Ok(())
}
