//! Typed view of scenario stdout.

use std::{str::FromStr, sync::LazyLock};

use forklab_types::process::ProcId;
use regex::Regex;

/// One line written by a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `parent <id>`
    Parent(ProcId),
    /// `child <id>`
    Child(ProcId),
    /// `<id> <iteration> <tag>`, written by a worker thread.
    Worker {
        pid: ProcId,
        iteration: usize,
        tag: String,
    },
    /// `a`, written once before duplicating.
    BeforeDuplicate,
    /// `b <child-id>`, written by both units; `0` in the copy.
    AfterDuplicate(u32),
    /// `about to duplicate, locked=<bool>`
    LockState { locked: bool },
    /// `got lock <id>`
    GotLock(ProcId),
    /// `lock stuck <id>`
    LockStuck(ProcId),
    /// Anything else, such as echoed input.
    Text(String),
}

static PARENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^parent (\d+)$").unwrap());
static CHILD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^child (\d+)$").unwrap());
static WORKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<pid>\d+) (?P<iter>\d+) (?P<tag>\S+)$").unwrap());
static AFTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^b (\d+)$").unwrap());
static LOCK_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^about to duplicate, locked=(true|false)$").unwrap());
static GOT_LOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^got lock (\d+)$").unwrap());
static LOCK_STUCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^lock stuck (\d+)$").unwrap());

fn capture<T>(re: &Regex, s: &str) -> Option<T>
where
    T: FromStr,
{
    re.captures(s)?.get(1)?.as_str().parse().ok()
}

impl Line {
    /// Classifies one line of output, without its trailing newline.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "a" {
            return Self::BeforeDuplicate;
        }
        if let Some(pid) = capture(&PARENT, s) {
            return Self::Parent(pid);
        }
        if let Some(pid) = capture(&CHILD, s) {
            return Self::Child(pid);
        }
        if let Some(id) = capture(&AFTER, s) {
            return Self::AfterDuplicate(id);
        }
        if let Some(locked) = capture(&LOCK_STATE, s) {
            return Self::LockState { locked };
        }
        if let Some(pid) = capture(&GOT_LOCK, s) {
            return Self::GotLock(pid);
        }
        if let Some(pid) = capture(&LOCK_STUCK, s) {
            return Self::LockStuck(pid);
        }
        let worker = WORKER.captures(s).and_then(|caps| {
            let pid = caps["pid"].parse().ok()?;
            let iteration = caps["iter"].parse().ok()?;
            Some(Self::Worker {
                pid,
                iteration,
                tag: caps["tag"].to_owned(),
            })
        });
        if let Some(line) = worker {
            return line;
        }
        Self::Text(s.to_owned())
    }
}

/// Splits stdout into typed lines.
#[must_use]
pub fn parse(stdout: &str) -> Vec<Line> {
    stdout.lines().map(Line::parse).collect()
}
