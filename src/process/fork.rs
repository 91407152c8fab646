/*!
 * Fork
 * Fire-and-forget spawning of a callback on its own task
 */

use super::fault::contain;
use super::invoke::invoke_callback;
use super::types::{Process, ProcessHandle, ProcessKind, ProcessState};
use super::validation::expect_callback;
use crate::core::config::RuntimeConfig;
use crate::core::errors::ScriptResult;
use crate::script::{Env, Value};
use std::sync::Arc;
use tracing::info;

/// Spawn `function` concurrently, passing it the new process's handle
///
/// Validation happens before anything is spawned. The handle is returned
/// immediately; the callback's eventual outcome is only logged.
pub fn fork(function: &Value, env: &Env, config: &RuntimeConfig) -> ScriptResult<ProcessHandle> {
    let callback = expect_callback("fork", function, env)?;

    let process = Process::new(ProcessKind::Forked, Arc::clone(env), callback, None, None);
    let handle = ProcessHandle::new(Arc::clone(&process));
    let frames = config.fault_frames;

    info!(process = %process.id(), scope = %env.name(), "Forking process");

    tokio::spawn(async move {
        // Held for the worker's lifetime so control signals see a live consumer
        let control = process.take_control();

        contain("fork", frames, invoke_callback(&process, "forked")).await;

        process.set_state(ProcessState::Finished);
        drop(control);
    });

    Ok(handle)
}
