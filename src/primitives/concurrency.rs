/*!
 * Concurrency Primitives
 * fork, proc-sleep, wake, schedule, reset-timeout and abandon
 *
 * Arguments are evaluated left to right in the caller's environment and each
 * is validated as soon as it has been evaluated.
 */

use super::registry::{PrimitiveCall, PrimitiveRegistry};
use crate::core::errors::ScriptResult;
use crate::core::types::{ALREADY_DONE_RESULT, OK_RESULT};
use crate::process::{self, expect_millis, expect_process, Delivery};
use crate::script::Value;
use futures::future::{BoxFuture, FutureExt};

/// Install the six concurrency primitives
pub fn register_concurrency_primitives(registry: &PrimitiveRegistry) {
    registry.register("fork", 1, fork_impl);
    registry.register("proc-sleep", 2, proc_sleep_impl);
    registry.register("wake", 1, wake_impl);
    registry.register("schedule", 2, schedule_impl);
    registry.register("reset-timeout", 1, reset_timeout_impl);
    registry.register("abandon", 1, abandon_impl);
}

/// Script result for a control-signal delivery
fn delivery_result(delivery: Delivery) -> Value {
    match delivery {
        Delivery::Delivered => Value::string(OK_RESULT),
        Delivery::Occupied | Delivery::Closed => Value::string(ALREADY_DONE_RESULT),
    }
}

fn fork_impl(call: PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>> {
    async move {
        let function = call.eval_arg(0).await?;
        let handle = process::fork(&function, &call.env, &call.config)?;
        Ok(handle.to_value())
    }
    .boxed()
}

fn proc_sleep_impl(call: PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>> {
    async move {
        let target = call.eval_arg(0).await?;
        let handle = expect_process("proc-sleep", &target, &call.env)?;

        let millis = call.eval_arg(1).await?;
        let millis = expect_millis("proc-sleep", &millis, &call.env)?;

        Ok(Value::boolean(handle.sleep(millis).await))
    }
    .boxed()
}

fn wake_impl(call: PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>> {
    async move {
        let target = call.eval_arg(0).await?;
        let handle = expect_process("wake", &target, &call.env)?;

        // The process owns its wake receiver, so delivery always lands
        handle.wake().await;
        Ok(Value::string(OK_RESULT))
    }
    .boxed()
}

fn schedule_impl(call: PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>> {
    async move {
        let millis = call.eval_arg(0).await?;
        let millis = expect_millis("schedule", &millis, &call.env)?;

        let function = call.eval_arg(1).await?;
        let handle = process::schedule(millis, &function, &call.env, &call.config)?;
        Ok(handle.to_value())
    }
    .boxed()
}

fn reset_timeout_impl(call: PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>> {
    async move {
        let target = call.eval_arg(0).await?;
        let handle = expect_process("reset-timeout", &target, &call.env)?;
        Ok(delivery_result(handle.reset_timeout()))
    }
    .boxed()
}

fn abandon_impl(call: PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>> {
    async move {
        let target = call.eval_arg(0).await?;
        let handle = expect_process("abandon", &target, &call.env)?;
        Ok(delivery_result(handle.abandon().await))
    }
    .boxed()
}
