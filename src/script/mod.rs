/*!
 * Script Module
 * Value, environment, expression and callable seams shared with the evaluator
 */

pub mod callable;
pub mod env;
pub mod expr;
pub mod object;
pub mod value;

// Re-export for convenience
pub use callable::{Callable, NativeFunction};
pub use env::{Env, Frame};
pub use expr::{Evaluate, Expr};
pub use object::ObjectHandle;
pub use value::Value;
