/*!
 * Lexical Environment
 * Named symbol-table frames shared between the caller and spawned processes
 */

use super::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a frame
pub type Env = Arc<Frame>;

/// A single scope with an optional parent
pub struct Frame {
    name: String,
    parent: Option<Env>,
    bindings: RwLock<HashMap<String, Value>>,
}

impl Frame {
    /// Create a root frame
    pub fn global() -> Env {
        Self::named("global")
    }

    pub fn named(name: impl Into<String>) -> Env {
        Arc::new(Self {
            name: name.into(),
            parent: None,
            bindings: RwLock::new(HashMap::new()),
        })
    }

    /// Create a frame nested inside `parent`
    pub fn child(parent: &Env, name: impl Into<String>) -> Env {
        Arc::new(Self {
            name: name.into(),
            parent: Some(Arc::clone(parent)),
            bindings: RwLock::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Env> {
        self.parent.as_ref()
    }

    /// Bind a symbol in this frame, shadowing outer bindings
    pub fn define(&self, symbol: impl Into<String>, value: Value) {
        self.bindings.write().insert(symbol.into(), value);
    }

    /// Resolve a symbol through the frame chain
    pub fn lookup(&self, symbol: &str) -> Option<Value> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if let Some(value) = current.bindings.read().get(symbol) {
                return Some(value.clone());
            }
            frame = current.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("name", &self.name)
            .field("bindings", &self.bindings.read().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
