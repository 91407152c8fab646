/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for every fallible script-facing operation
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Script evaluation errors with serialization support
///
/// `Type` and `Arity` are raised synchronously by the concurrency primitives
/// and carry the name of the frame that was active at the call site.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ScriptError {
    #[error("{message}")]
    #[diagnostic(
        code(script::type_error),
        help("The argument evaluated to a value of the wrong kind.")
    )]
    Type { message: String, scope: String },

    #[error("{message}")]
    #[diagnostic(
        code(script::arity_error),
        help("Process callbacks must take exactly one argument: the process handle.")
    )]
    Arity { message: String, scope: String },

    #[error("{name} expects {expected} argument(s), but received {received}")]
    #[diagnostic(
        code(script::argument_count),
        help("Check the number of arguments passed to the primitive.")
    )]
    ArgumentCount {
        name: String,
        expected: usize,
        received: usize,
    },

    #[error("Unbound symbol: {0}")]
    #[diagnostic(
        code(script::unbound_symbol),
        help("Define the symbol in an enclosing scope before using it.")
    )]
    Unbound(String),

    #[error("Unknown primitive: {0}")]
    #[diagnostic(
        code(script::unknown_primitive),
        help("Register the primitive before calling it.")
    )]
    UnknownPrimitive(String),

    #[error("{0}")]
    #[diagnostic(code(script::callback_error))]
    Callback(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(script::configuration_error),
        help("Invalid configuration. Review configuration parameters.")
    )]
    Config(String),
}

impl ScriptError {
    /// Build a type error tagged with the active frame
    pub fn type_error(message: impl Into<String>, scope: impl Into<String>) -> Self {
        ScriptError::Type {
            message: message.into(),
            scope: scope.into(),
        }
    }

    /// Build an arity error tagged with the active frame
    pub fn arity_error(message: impl Into<String>, scope: impl Into<String>) -> Self {
        ScriptError::Arity {
            message: message.into(),
            scope: scope.into(),
        }
    }

    /// Name of the frame the error was raised in, if it carries one
    pub fn scope(&self) -> Option<&str> {
        match self {
            ScriptError::Type { scope, .. } | ScriptError::Arity { scope, .. } => Some(scope),
            _ => None,
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, ScriptError::Type { .. })
    }

    pub fn is_arity_error(&self) -> bool {
        matches!(self, ScriptError::Arity { .. })
    }
}

impl From<String> for ScriptError {
    fn from(msg: String) -> Self {
        ScriptError::Callback(msg)
    }
}

impl From<&str> for ScriptError {
    fn from(msg: &str) -> Self {
        ScriptError::Callback(msg.to_string())
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(err: serde_json::Error) -> Self {
        ScriptError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(err: std::io::Error) -> Self {
        ScriptError::Config(err.to_string())
    }
}
