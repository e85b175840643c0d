use core::{fmt, num::NonZero, str::FromStr};

/// Identifier of an execution unit, as assigned by the platform.
///
/// A process identifier is never zero: zero is what a freshly duplicated
/// unit sees in place of a child identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ProcId(NonZero<u32>);

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProcId> for u32 {
    fn from(value: ProcId) -> Self {
        value.0.get()
    }
}

impl From<ProcId> for NonZero<u32> {
    fn from(value: ProcId) -> Self {
        value.0
    }
}

impl From<NonZero<u32>> for ProcId {
    fn from(value: NonZero<u32>) -> Self {
        Self(value)
    }
}

/// Error returned when a raw identifier is not a valid [`ProcId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidProcId(pub i32);

impl fmt::Display for InvalidProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid process id {}", self.0)
    }
}

impl core::error::Error for InvalidProcId {}

impl TryFrom<i32> for ProcId {
    type Error = InvalidProcId;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        u32::try_from(raw)
            .ok()
            .and_then(NonZero::new)
            .map(Self)
            .ok_or(InvalidProcId(raw))
    }
}

impl ProcId {
    #[must_use]
    pub const fn new(value: NonZero<u32>) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> NonZero<u32> {
        self.0
    }

    /// Returns the identifier as the signed integer the OS interfaces use.
    ///
    /// # Panics
    ///
    /// Panics if the identifier does not fit in an `i32`, which no platform
    /// assigns.
    #[must_use]
    pub fn as_raw(self) -> i32 {
        i32::try_from(self.0.get()).unwrap()
    }
}

impl FromStr for ProcId {
    type Err = <NonZero<u32> as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::new)
    }
}

/// Represents the exit status of a process.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    status: i32,
}

impl ExitStatus {
    /// Status reported for a process terminated by a signal.
    pub const KILLED: Self = Self { status: -1 };

    /// Creates a new `ExitStatus` with the given status code.
    #[must_use]
    pub const fn new(status: i32) -> Self {
        Self { status }
    }

    /// Checks if the process exited successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Returns the status code of the process.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.status
    }
}
