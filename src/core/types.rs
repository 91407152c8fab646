/*!
 * Core Types
 * Common types used across the process subsystem
 */

use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Delay in milliseconds as supplied by scripts (any sign)
pub type Millis = i64;

/// Tag carried by every process handle
pub const PROCESS_TAG: &str = "Process";

/// Result string of a successful signal delivery
pub const OK_RESULT: &str = "OK";

/// Result string when a control signal has no live consumer
pub const ALREADY_DONE_RESULT: &str = "task was already completed or abandoned";

/// Log-correlation id for a process
///
/// Identity of a process is its handle; this id only ties log lines together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(Uuid);

impl ProcessId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert script milliseconds into a timer duration
///
/// Non-positive delays elapse immediately.
#[inline]
pub fn millis_to_duration(millis: Millis) -> Duration {
    Duration::from_millis(millis.max(0) as u64)
}
