/*!
 * Fork Tests
 * Spawning, handle identity, captured environments and contained faults
 */

use crate::common::{self, LogCapture};
use pretty_assertions::assert_eq;
use script_proc::process::fork;
use script_proc::{
    Expr, Frame, NativeFunction, ProcessHandle, ProcessState, RuntimeConfig, ScriptError,
    ScriptResult, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::Level;

async fn wait_for_state(handle: &ProcessHandle, state: ProcessState) {
    for _ in 0..100 {
        if handle.state() == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("process never reached {:?}, still {:?}", state, handle.state());
}

#[tokio::test]
async fn test_fork_runs_callback_once_in_captured_env() {
    let caller = Frame::named("caller");
    caller.define("greeting", Value::string("hello"));

    let (tx, rx) = oneshot::channel();
    let tx = parking_lot::Mutex::new(Some(tx));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let callback = NativeFunction::new("probe", 1, move |args, env| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send((args[0].clone(), env.name().to_string(), env.lookup("greeting")));
        }
        async { Ok(Value::Nil) }
    });

    let handle = fork(&callback.into_value(), &caller, &RuntimeConfig::default()).unwrap();
    let (arg, scope, greeting) = rx.await.unwrap();

    assert!(ProcessHandle::from_value(&arg).unwrap().same_process(&handle));
    assert_eq!(scope, "caller");
    assert_eq!(greeting, Some(Value::string("hello")));

    wait_for_state(&handle, ProcessState::Finished).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fork_returns_before_callback_completes() {
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let release_rx = parking_lot::Mutex::new(Some(release_rx));

    let callback = NativeFunction::new("blocked", 1, move |_args, _env| {
        let rx = release_rx.lock().take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            Ok(Value::Nil)
        }
    });

    let handle = fork(&callback.into_value(), &Frame::global(), &RuntimeConfig::default()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state(), ProcessState::Running);

    release_tx.send(()).unwrap();
    wait_for_state(&handle, ProcessState::Finished).await;
}

#[tokio::test]
async fn test_fork_rejects_non_function() {
    let registry = common::registry();
    let env = Frame::named("caller");

    let err = registry
        .call("fork", vec![common::int(5)], &env)
        .await
        .unwrap_err();

    assert!(err.is_type_error());
    assert_eq!(err.to_string(), "fork expected a function, but received 5.");
    assert_eq!(err.scope(), Some("caller"));
}

#[tokio::test]
async fn test_fork_propagates_evaluation_error() {
    let registry = common::registry();
    let err = registry
        .call("fork", vec![Expr::symbol("nowhere")], &Frame::global())
        .await
        .unwrap_err();

    assert_eq!(err, ScriptError::Unbound("nowhere".to_string()));
}

#[tokio::test]
async fn test_faulting_callback_is_contained_and_logged() {
    let logs = LogCapture::new();
    let _guard = logs.install(Level::ERROR);

    async fn explode() -> ScriptResult<Value> {
        panic!("forked callback exploded")
    }

    let registry = common::registry();
    let env = Frame::global();
    env.define("g", NativeFunction::new("g", 1, |_args, _env| explode()).into_value());

    // The handle comes back synchronously; the fault is never observable here
    let value = registry.call("fork", vec![Expr::symbol("g")], &env).await.unwrap();
    let handle = ProcessHandle::from_value(&value).unwrap();

    wait_for_state(&handle, ProcessState::Finished).await;

    assert!(logs.contains("fork: runtime fault: forked callback exploded"));
    let frame_lines = logs
        .lines_with("fork: ")
        .into_iter()
        .filter(|line| !line.contains("runtime fault"))
        .count();
    assert!(frame_lines <= RuntimeConfig::default().fault_frames);
}

#[tokio::test]
async fn test_fault_excerpt_respects_configured_depth() {
    let logs = LogCapture::new();
    let _guard = logs.install(Level::ERROR);

    async fn explode() -> ScriptResult<Value> {
        panic!("shallow")
    }

    let config = RuntimeConfig::default().with_fault_frames(1);
    let callback = NativeFunction::new("g", 1, |_args, _env| explode()).into_value();
    let handle = fork(&callback, &Frame::global(), &config).unwrap();

    wait_for_state(&handle, ProcessState::Finished).await;

    let fault_lines = logs.lines_with("fork: ");
    assert!(!fault_lines.is_empty());
    assert!(fault_lines.len() <= 2);
}

#[tokio::test]
async fn test_error_result_is_logged_not_surfaced() {
    let logs = LogCapture::new();
    let _guard = logs.install(Level::WARN);

    let callback = NativeFunction::new("failing", 1, |_args, _env| async {
        Err(ScriptError::Callback("disk on fire".to_string()))
    });

    let handle = fork(&callback.into_value(), &Frame::global(), &RuntimeConfig::default()).unwrap();
    wait_for_state(&handle, ProcessState::Finished).await;

    assert!(logs.contains("error in forked process: disk on fire"));
    assert!(!logs.contains("runtime fault"));
}

#[tokio::test]
async fn test_control_signals_on_forked_process() {
    let registry = common::registry();
    let env = Frame::global();
    env.define("idle", NativeFunction::new("idle", 1, |_args, _env| async { Ok(Value::Nil) }).into_value());

    let value = registry.call("fork", vec![Expr::symbol("idle")], &env).await.unwrap();
    let handle = ProcessHandle::from_value(&value).unwrap();
    wait_for_state(&handle, ProcessState::Finished).await;

    let reset = registry.call("reset-timeout", vec![common::lit(&value)], &env).await.unwrap();
    assert_eq!(reset, Value::string("task was already completed or abandoned"));

    let abandoned = registry.call("abandon", vec![common::lit(&value)], &env).await.unwrap();
    assert_eq!(abandoned, Value::string("task was already completed or abandoned"));
}
