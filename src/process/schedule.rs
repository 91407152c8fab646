/*!
 * Schedule Controller
 *
 * Deferred invocation of a callback behind a resettable timer. The
 * controller task waits on three events:
 *
 * - abort:   Armed -> Aborted, the callback never runs
 * - restart: timer re-armed for the delay captured at schedule time
 * - elapse:  Armed -> Fired, the callback runs once on the controller task
 *
 * The controller drops its control receivers as soon as it leaves the
 * Armed state, so later `abandon` / `reset-timeout` calls see no consumer.
 */

use super::fault::contain;
use super::invoke::invoke_callback;
use super::signal::Delivery;
use super::types::{ControlSignals, Process, ProcessHandle, ProcessKind, ProcessState};
use super::validation::expect_callback;
use crate::core::config::RuntimeConfig;
use crate::core::errors::ScriptResult;
use crate::core::types::{millis_to_duration, Millis};
use crate::script::{Env, Value};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

/// How the Armed state was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Aborted,
    Elapsed,
}

/// Arm a timer for `millis` and start the controller that will fire `function`
pub fn schedule(
    millis: Millis,
    function: &Value,
    env: &Env,
    config: &RuntimeConfig,
) -> ScriptResult<ProcessHandle> {
    let callback = expect_callback("schedule", function, env)?;

    let timer = Box::pin(tokio::time::sleep(millis_to_duration(millis)));
    let process = Process::new(
        ProcessKind::Scheduled,
        Arc::clone(env),
        callback,
        Some(millis),
        Some(timer),
    );
    let handle = ProcessHandle::new(Arc::clone(&process));
    let frames = config.fault_frames;

    info!(process = %process.id(), millis, scope = %env.name(), "Scheduling process");

    tokio::spawn(async move {
        if let Some(control) = process.take_control() {
            contain("schedule", frames, run_controller(&process, control)).await;
        }
    });

    Ok(handle)
}

/// Three-way wait loop driving a scheduled process
async fn run_controller(process: &Arc<Process>, control: ControlSignals) {
    let ControlSignals {
        mut abort,
        mut restart,
        timer,
    } = control;

    let delay = millis_to_duration(process.delay().unwrap_or_default());
    let mut timer = timer.unwrap_or_else(|| Box::pin(tokio::time::sleep(delay)));

    let exit = loop {
        tokio::select! {
            biased;
            Some(_) = abort.recv() => break Exit::Aborted,
            Some(_) = restart.recv() => {
                timer.as_mut().reset(Instant::now() + delay);
                debug!(process = %process.id(), delay_ms = delay.as_millis() as u64, "Schedule timer restarted");
            }
            _ = timer.as_mut() => break Exit::Elapsed,
        }
    };

    // Leaving Armed: nothing consumes control signals from here on
    drop(abort);
    drop(restart);

    match exit {
        Exit::Aborted => {
            process.set_state(ProcessState::Aborted);
            info!(process = %process.id(), "Scheduled process abandoned");
        }
        Exit::Elapsed => {
            process.set_state(ProcessState::Fired);
            invoke_callback(process, "scheduled").await;
        }
    }
}

impl Process {
    /// Ask the controller to abandon the pending invocation
    ///
    /// Waits while a previous abort is still undelivered. Once the
    /// controller has left the Armed state this returns `Closed` instead of
    /// waiting forever.
    pub async fn abandon(&self) -> Delivery {
        let delivery = self.abort_tx.deliver().await;
        debug!(process = %self.id(), ?delivery, "Abandon requested");
        delivery
    }

    /// Push the pending invocation out by the original delay
    ///
    /// Never waits: reports `Occupied` or `Closed` when the controller cannot
    /// take the request right now.
    pub fn reset_timeout(&self) -> Delivery {
        let delivery = self.restart_tx.try_deliver();
        debug!(process = %self.id(), ?delivery, "Timeout reset requested");
        delivery
    }
}
