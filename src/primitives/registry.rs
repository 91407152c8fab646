/*!
 * Primitive Registry
 * Name-indexed native functions with declared arity and async dispatch
 */

use crate::core::config::RuntimeConfig;
use crate::core::errors::{ScriptError, ScriptResult};
use crate::monitoring::PrimitiveSpan;
use crate::script::{Env, Expr, Value};
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::Instrument;

/// Everything a primitive receives: unevaluated arguments and the caller's scope
pub struct PrimitiveCall {
    pub args: Vec<Expr>,
    pub env: Env,
    pub config: Arc<RuntimeConfig>,
}

impl PrimitiveCall {
    /// Evaluate the argument at `index` in the caller's environment
    pub async fn eval_arg(&self, index: usize) -> ScriptResult<Value> {
        use crate::script::Evaluate;

        match self.args.get(index) {
            Some(expr) => expr.eval(&self.env).await,
            None => Err(ScriptError::ArgumentCount {
                name: "argument".to_string(),
                expected: index + 1,
                received: self.args.len(),
            }),
        }
    }
}

/// Native implementation of a primitive
pub type PrimitiveFn = fn(PrimitiveCall) -> BoxFuture<'static, ScriptResult<Value>>;

/// A registered primitive
#[derive(Debug, Clone)]
pub struct Primitive {
    name: String,
    arity: usize,
    func: PrimitiveFn,
}

impl Primitive {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// Registry of primitives shared by every evaluation
#[derive(Clone)]
pub struct PrimitiveRegistry {
    primitives: Arc<DashMap<String, Arc<Primitive>>>,
    config: Arc<RuntimeConfig>,
}

impl PrimitiveRegistry {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            primitives: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Register (or replace) a primitive
    pub fn register(&self, name: &str, arity: usize, func: PrimitiveFn) {
        let primitive = Primitive {
            name: name.to_string(),
            arity,
            func,
        };
        if self
            .primitives
            .insert(name.to_string(), Arc::new(primitive))
            .is_some()
        {
            tracing::debug!(primitive = name, "Primitive replaced");
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Primitive>> {
        self.primitives.get(name).map(|p| Arc::clone(p.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.primitives.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Invoke `name` with unevaluated `args` in `env`
    pub async fn call(&self, name: &str, args: Vec<Expr>, env: &Env) -> ScriptResult<Value> {
        let primitive = self
            .lookup(name)
            .ok_or_else(|| ScriptError::UnknownPrimitive(name.to_string()))?;

        if args.len() != primitive.arity {
            return Err(ScriptError::ArgumentCount {
                name: primitive.name.clone(),
                expected: primitive.arity,
                received: args.len(),
            });
        }

        let span = PrimitiveSpan::new(name, env.name(), args.len());
        let call = PrimitiveCall {
            args,
            env: Arc::clone(env),
            config: Arc::clone(&self.config),
        };

        let result = (primitive.func)(call).instrument(span.span().clone()).await;
        match &result {
            Ok(_) => span.record_result(true),
            Err(e) => span.record_error(&e.to_string()),
        }
        result
    }
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
