/*!
 * Process Argument Validation
 * Type and arity checks applied before any process is created
 */

use super::types::ProcessHandle;
use crate::core::errors::{ScriptError, ScriptResult};
use crate::core::types::Millis;
use crate::script::{Callable, Env, Value};
use std::sync::Arc;

/// Arity every process callback must declare: the handle itself
pub const CALLBACK_ARITY: usize = 1;

/// Validate a process callback: callable with exactly one required argument
pub fn expect_callback(primitive: &str, value: &Value, env: &Env) -> ScriptResult<Arc<dyn Callable>> {
    let Some(function) = value.as_function() else {
        return Err(ScriptError::type_error(
            format!("{} expected a function, but received {}.", primitive, value),
            env.name(),
        ));
    };

    let arity = function.required_arg_count();
    if arity != CALLBACK_ARITY {
        return Err(ScriptError::arity_error(
            format!(
                "{} expected a function with arity of {}, but it was {}.",
                primitive, CALLBACK_ARITY, arity
            ),
            env.name(),
        ));
    }

    Ok(Arc::clone(function))
}

/// Validate a millisecond delay
pub fn expect_millis(primitive: &str, value: &Value, env: &Env) -> ScriptResult<Millis> {
    value.as_integer().ok_or_else(|| {
        ScriptError::type_error(
            format!("{} expected an integer as a delay, but received {}.", primitive, value),
            env.name(),
        )
    })
}

/// Validate a process handle
pub fn expect_process(primitive: &str, value: &Value, env: &Env) -> ScriptResult<ProcessHandle> {
    ProcessHandle::from_value(value).ok_or_else(|| {
        ScriptError::type_error(
            format!(
                "{} expects a Process object but received {}.",
                primitive,
                value.type_name()
            ),
            env.name(),
        )
    })
}
