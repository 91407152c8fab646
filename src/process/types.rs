/*!
 * Process Types
 * The process entity, its control signals and its script-visible handle
 */

use super::signal::{signal_channel, SignalReceiver, SignalSender};
use crate::core::types::{Millis, ProcessId, PROCESS_TAG};
use crate::script::{Callable, Env, ObjectHandle, Value};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::time::Sleep;

/// How the process was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessKind {
    Forked,
    Scheduled,
}

/// Lifecycle of a process's work
///
/// Forked: Running -> Finished. Scheduled: Armed -> Fired | Aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProcessState {
    /// Forked callback is executing
    Running = 0,
    /// Forked callback returned or faulted
    Finished = 1,
    /// Scheduled timer is pending
    Armed = 2,
    /// Scheduled timer elapsed and the callback was dispatched
    Fired = 3,
    /// Scheduled process was abandoned before its timer elapsed
    Aborted = 4,
}

impl ProcessState {
    /// Inverse of `state as u8`; the state cell is only ever written from a `ProcessState`
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ProcessState::Running,
            1 => ProcessState::Finished,
            2 => ProcessState::Armed,
            3 => ProcessState::Fired,
            4 => ProcessState::Aborted,
            other => unreachable!("process state cell holds {}", other),
        }
    }

    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessState::Finished | ProcessState::Fired | ProcessState::Aborted
        )
    }
}

/// Receiving ends owned by the task doing the process's work
///
/// Dropping them tells `abandon` / `reset-timeout` that nobody is listening.
pub(crate) struct ControlSignals {
    pub(crate) abort: SignalReceiver,
    pub(crate) restart: SignalReceiver,
    pub(crate) timer: Option<Pin<Box<Sleep>>>,
}

/// One spawned or scheduled unit of script work
pub struct Process {
    id: ProcessId,
    kind: ProcessKind,
    env: Env,
    callback: Arc<dyn Callable>,
    delay: Option<Millis>,
    state: AtomicU8,
    pub(crate) wake_tx: SignalSender,
    pub(crate) wake_rx: tokio::sync::Mutex<SignalReceiver>,
    pub(crate) abort_tx: SignalSender,
    pub(crate) restart_tx: SignalSender,
    control: Mutex<Option<ControlSignals>>,
}

impl Process {
    /// Allocate a process with fresh signal channels
    ///
    /// `timer` is armed by the caller for scheduled processes.
    pub(crate) fn new(
        kind: ProcessKind,
        env: Env,
        callback: Arc<dyn Callable>,
        delay: Option<Millis>,
        timer: Option<Pin<Box<Sleep>>>,
    ) -> Arc<Self> {
        let (wake_tx, wake_rx) = signal_channel();
        let (abort_tx, abort_rx) = signal_channel();
        let (restart_tx, restart_rx) = signal_channel();

        let initial = match kind {
            ProcessKind::Forked => ProcessState::Running,
            ProcessKind::Scheduled => ProcessState::Armed,
        };

        Arc::new(Self {
            id: ProcessId::generate(),
            kind,
            env,
            callback,
            delay,
            state: AtomicU8::new(initial as u8),
            wake_tx,
            wake_rx: tokio::sync::Mutex::new(wake_rx),
            abort_tx,
            restart_tx,
            control: Mutex::new(Some(ControlSignals {
                abort: abort_rx,
                restart: restart_rx,
                timer,
            })),
        })
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    /// Scope captured when the process was created
    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn callback(&self) -> &Arc<dyn Callable> {
        &self.callback
    }

    /// Delay captured by `schedule`; reused on every restart
    pub fn delay(&self) -> Option<Millis> {
        self.delay
    }

    pub fn state(&self) -> ProcessState {
        ProcessState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ProcessState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Hand the control receivers to the task that owns the work
    pub(crate) fn take_control(&self) -> Option<ControlSignals> {
        self.control.lock().take()
    }

    /// Whether a task is still holding the control receivers
    pub fn is_listening(&self) -> bool {
        self.abort_tx.has_consumer()
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .field("delay", &self.delay)
            .field("env", &self.env.name())
            .field("callback", &self.callback.name())
            .finish()
    }
}

/// Script-visible reference to a process
#[derive(Clone)]
pub struct ProcessHandle {
    process: Arc<Process>,
}

impl ProcessHandle {
    pub(crate) fn new(process: Arc<Process>) -> Self {
        Self { process }
    }

    /// Checked recovery from a script value
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_object()
            .and_then(|obj| obj.downcast::<Process>(PROCESS_TAG))
            .map(Self::new)
    }

    /// Wrap as an opaque object tagged `Process`
    pub fn to_value(&self) -> Value {
        Value::Object(ObjectHandle::new(PROCESS_TAG, Arc::clone(&self.process)))
    }

    pub fn process(&self) -> &Arc<Process> {
        &self.process
    }

    /// Both handles refer to the same process
    pub fn same_process(&self, other: &ProcessHandle) -> bool {
        Arc::ptr_eq(&self.process, &other.process)
    }
}

impl Deref for ProcessHandle {
    type Target = Process;

    fn deref(&self) -> &Process {
        &self.process
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.process, f)
    }
}

impl From<ProcessHandle> for Value {
    fn from(handle: ProcessHandle) -> Self {
        handle.to_value()
    }
}
