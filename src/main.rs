/*!
 * Script Process Demo - Main Entry Point
 *
 * Drives the concurrency primitives the way a script would:
 * - fork + proc-sleep/wake
 * - schedule + reset-timeout
 * - schedule + abandon
 * - a forked callback that faults
 */

use script_proc::{
    init_tracing, register_concurrency_primitives, Env, Expr, Frame, NativeFunction,
    PrimitiveRegistry, RuntimeConfig, ScriptError, Value,
};
use std::time::Duration;
use tracing::info;

fn literal(value: &Value) -> Expr {
    Expr::Literal(value.clone())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::from_env()?;
    init_tracing(&config);

    info!("Script process demo starting...");
    info!("================================================");

    let registry = PrimitiveRegistry::new(config);
    register_concurrency_primitives(&registry);
    info!(primitives = ?registry.names(), "Concurrency primitives registered");

    let env: Env = Frame::global();

    // Forked sleeper: parks itself until woken or 1s passes
    let sleeper_registry = registry.clone();
    let sleeper = NativeFunction::new("sleeper", 1, move |args, env| {
        let registry = sleeper_registry.clone();
        async move {
            let woken = registry
                .call(
                    "proc-sleep",
                    vec![literal(&args[0]), Expr::Literal(Value::integer(1_000))],
                    &env,
                )
                .await?;
            info!(woken = %woken, "Forked sleeper resumed");
            Ok::<_, ScriptError>(woken)
        }
    });
    env.define("sleeper", sleeper.into_value());

    let sleeper_proc = registry.call("fork", vec![Expr::symbol("sleeper")], &env).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let woke = registry.call("wake", vec![literal(&sleeper_proc)], &env).await?;
    info!(result = %woke, "wake delivered");

    // Scheduled ticker, pushed out once
    let ticker = NativeFunction::new("ticker", 1, |_args, _env| async {
        info!("Scheduled ticker fired");
        Ok(Value::Nil)
    });
    env.define("ticker", ticker.into_value());

    let ticker_proc = registry
        .call(
            "schedule",
            vec![Expr::Literal(Value::integer(200)), Expr::symbol("ticker")],
            &env,
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let reset = registry.call("reset-timeout", vec![literal(&ticker_proc)], &env).await?;
    info!(result = %reset, "reset-timeout while armed");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let reset = registry.call("reset-timeout", vec![literal(&ticker_proc)], &env).await?;
    info!(result = %reset, "reset-timeout after firing");

    // Scheduled callback abandoned before it fires
    let doomed = registry
        .call(
            "schedule",
            vec![Expr::Literal(Value::integer(500)), Expr::symbol("ticker")],
            &env,
        )
        .await?;
    let abandoned = registry.call("abandon", vec![literal(&doomed)], &env).await?;
    info!(result = %abandoned, "abandon while armed");

    // Forked callback that faults: contained and logged, never surfaced here
    let faulty = NativeFunction::new("faulty", 1, |_args, _env| async {
        let divisor = std::hint::black_box(0);
        Ok::<_, ScriptError>(Value::integer(1 / divisor))
    });
    env.define("faulty", faulty.into_value());
    registry.call("fork", vec![Expr::symbol("faulty")], &env).await?;

    // Validation errors are synchronous
    if let Err(e) = registry.call("fork", vec![Expr::Literal(Value::integer(5))], &env).await {
        info!(error = %e, "fork rejected a non-function");
    }

    tokio::time::sleep(Duration::from_millis(200)).await;

    info!("================================================");
    info!("Script process demo complete");
    Ok(())
}
