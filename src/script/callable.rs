/*!
 * Callable Values
 * Functions that can be applied to pre-evaluated arguments
 */

use super::env::Env;
use super::value::Value;
use crate::core::errors::{ScriptError, ScriptResult};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

/// A function value the evaluator can apply
pub trait Callable: Send + Sync {
    fn name(&self) -> String;

    /// Number of arguments the function requires
    fn required_arg_count(&self) -> usize;

    /// Apply to already-evaluated arguments in `env`
    fn apply_without_eval(&self, args: Vec<Value>, env: Env) -> BoxFuture<'static, ScriptResult<Value>>;
}

type NativeFn = dyn Fn(Vec<Value>, Env) -> BoxFuture<'static, ScriptResult<Value>> + Send + Sync;

/// A callable backed by a Rust closure
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    arity: usize,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F, Fut>(name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(Vec<Value>, Env) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScriptResult<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            arity,
            func: Arc::new(move |args, env| func(args, env).boxed()),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Function(Arc::new(self))
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn required_arg_count(&self) -> usize {
        self.arity
    }

    fn apply_without_eval(&self, args: Vec<Value>, env: Env) -> BoxFuture<'static, ScriptResult<Value>> {
        if args.len() != self.arity {
            let err = ScriptError::ArgumentCount {
                name: self.name.clone(),
                expected: self.arity,
                received: args.len(),
            };
            return futures::future::ready(Err(err)).boxed();
        }
        (self.func)(args, env)
    }
}
