/*!
 * Script Process Library
 * Concurrency primitives for an embeddable scripting runtime: fork,
 * sleep/wake and cancellable scheduled callbacks
 */

pub mod core;
pub mod monitoring;
pub mod primitives;
pub mod process;
pub mod script;

// Re-exports
pub use crate::core::{RuntimeConfig, ScriptError, ScriptResult};
pub use monitoring::init_tracing;
pub use primitives::{register_concurrency_primitives, PrimitiveRegistry};
pub use process::{Delivery, Process, ProcessHandle, ProcessKind, ProcessState};
pub use script::{Callable, Env, Evaluate, Expr, Frame, NativeFunction, ObjectHandle, Value};
