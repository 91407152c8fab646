/*!
 * Expressions
 * The evaluation seam primitives use to turn their arguments into values
 */

use super::env::Env;
use super::value::Value;
use crate::core::errors::{ScriptError, ScriptResult};
use futures::future::{BoxFuture, FutureExt};

/// Anything that can be evaluated to a value in an environment
pub trait Evaluate: Send + Sync {
    fn eval<'a>(&'a self, env: &'a Env) -> BoxFuture<'a, ScriptResult<Value>>;
}

/// Unevaluated primitive argument
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Self-evaluating value
    Literal(Value),
    /// Symbol resolved through the environment
    Symbol(String),
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl Evaluate for Expr {
    fn eval<'a>(&'a self, env: &'a Env) -> BoxFuture<'a, ScriptResult<Value>> {
        let result = match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Symbol(name) => env
                .lookup(name)
                .ok_or_else(|| ScriptError::Unbound(name.clone())),
        };
        futures::future::ready(result).boxed()
    }
}
