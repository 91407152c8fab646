/*!
 * Sleep / Wake Tests
 * proc-sleep and wake driven through the primitive registry
 */

use crate::common;
use pretty_assertions::assert_eq;
use script_proc::{Expr, Frame, NativeFunction, ProcessHandle, Value};
use std::time::Duration;
use tokio::time::Instant;

/// Fork an idle process and bind it to `p` in a fresh global scope
async fn forked_process() -> (script_proc::PrimitiveRegistry, script_proc::Env, Value) {
    let registry = common::registry();
    let env = Frame::global();
    env.define(
        "idle",
        NativeFunction::new("idle", 1, |_args, _env| async { Ok(Value::Nil) }).into_value(),
    );

    let process = registry
        .call("fork", vec![Expr::symbol("idle")], &env)
        .await
        .unwrap();
    env.define("p", process.clone());
    (registry, env, process)
}

#[tokio::test(start_paused = true)]
async fn test_sleep_without_wake_times_out() {
    let (registry, env, _) = forked_process().await;
    let start = Instant::now();

    let result = registry
        .call("proc-sleep", vec![Expr::symbol("p"), common::int(100)], &env)
        .await
        .unwrap();

    assert_eq!(result, Value::boolean(false));
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_wake_during_sleep_returns_true_early() {
    let (registry, env, process) = forked_process().await;
    let start = Instant::now();

    let sleeper = {
        let registry = registry.clone();
        let env = env.clone();
        tokio::spawn(async move {
            registry
                .call("proc-sleep", vec![Expr::symbol("p"), common::int(1_000)], &env)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let woke = registry
        .call("wake", vec![common::lit(&process)], &env)
        .await
        .unwrap();
    assert_eq!(woke, Value::string("OK"));

    assert_eq!(sleeper.await.unwrap().unwrap(), Value::boolean(true));
    assert!(start.elapsed() < Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn test_wake_is_consumed_once() {
    let (registry, env, _) = forked_process().await;

    registry.call("wake", vec![Expr::symbol("p")], &env).await.unwrap();

    let first = registry
        .call("proc-sleep", vec![Expr::symbol("p"), common::int(100)], &env)
        .await
        .unwrap();
    let second = registry
        .call("proc-sleep", vec![Expr::symbol("p"), common::int(100)], &env)
        .await
        .unwrap();

    assert_eq!(first, Value::boolean(true));
    assert_eq!(second, Value::boolean(false));
}

#[tokio::test(start_paused = true)]
async fn test_second_wake_blocks_until_drained() {
    let (registry, env, process) = forked_process().await;
    let handle = ProcessHandle::from_value(&process).unwrap();

    registry.call("wake", vec![Expr::symbol("p")], &env).await.unwrap();

    // Slot is full and nobody is sleeping: the next wake has to wait
    let blocked = tokio::time::timeout(
        Duration::from_millis(200),
        registry.call("wake", vec![Expr::symbol("p")], &env),
    )
    .await;
    assert!(blocked.is_err());

    let pending = {
        let registry = registry.clone();
        let env = env.clone();
        tokio::spawn(async move { registry.call("wake", vec![Expr::symbol("p")], &env).await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!pending.is_finished());

    assert!(handle.sleep(100).await);
    assert_eq!(pending.await.unwrap().unwrap(), Value::string("OK"));
}

#[tokio::test(start_paused = true)]
async fn test_sleep_and_wake_reject_non_process() {
    let registry = common::registry();
    let env = Frame::named("caller");

    let err = registry
        .call("proc-sleep", vec![common::int(3), common::int(100)], &env)
        .await
        .unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(
        err.to_string(),
        "proc-sleep expects a Process object but received Integer."
    );

    let err = registry
        .call("wake", vec![Expr::literal("p")], &env)
        .await
        .unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(err.to_string(), "wake expects a Process object but received String.");
    assert_eq!(err.scope(), Some("caller"));
}

#[tokio::test(start_paused = true)]
async fn test_sleep_rejects_non_integer_delay() {
    let (registry, env, _) = forked_process().await;

    let err = registry
        .call("proc-sleep", vec![Expr::symbol("p"), Expr::literal(true)], &env)
        .await
        .unwrap_err();

    assert!(err.is_type_error());
    assert_eq!(
        err.to_string(),
        "proc-sleep expected an integer as a delay, but received #t."
    );
}

#[tokio::test(start_paused = true)]
async fn test_sleep_on_finished_process_still_honours_wake() {
    let (registry, env, process) = forked_process().await;
    let handle = ProcessHandle::from_value(&process).unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(handle.state().is_terminal());

    // Wake/sleep are independent of the lifecycle
    registry.call("wake", vec![Expr::symbol("p")], &env).await.unwrap();
    let woken = registry
        .call("proc-sleep", vec![Expr::symbol("p"), common::int(50)], &env)
        .await
        .unwrap();
    assert_eq!(woken, Value::boolean(true));
}
