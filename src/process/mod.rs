/*!
 * Process Module
 * Spawned and scheduled script work, its signalling and fault containment
 */

pub mod fault;
pub mod fork;
mod invoke;
pub mod schedule;
pub mod signal;
pub mod sleep;
pub mod types;
pub mod validation;

// Re-export for convenience
pub use fault::{contain, contain_fault, Fault};
pub use fork::fork;
pub use schedule::schedule;
pub use signal::{signal_channel, Delivery, SignalReceiver, SignalSender, SIGNAL_CAPACITY};
pub use types::{Process, ProcessHandle, ProcessKind, ProcessState};
pub use validation::{expect_callback, expect_millis, expect_process, CALLBACK_ARITY};
