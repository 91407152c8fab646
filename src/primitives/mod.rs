/*!
 * Primitives Module
 * Registration and dispatch of native functions exposed to scripts
 */

mod concurrency;
mod registry;

pub use concurrency::register_concurrency_primitives;
pub use registry::{Primitive, PrimitiveCall, PrimitiveFn, PrimitiveRegistry};
