/*!
 * Monitoring
 * Structured logging setup and primitive call tracing
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, PrimitiveSpan};
