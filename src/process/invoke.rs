/*!
 * Callback Invocation
 * Applies a process callback to its own handle and logs error results
 */

use super::types::{Process, ProcessHandle};
use std::sync::Arc;
use tracing::{debug, warn};

/// Apply the process callback once with the handle as its sole argument
///
/// An error value returned by the callback is logged and dropped.
pub(super) async fn invoke_callback(process: &Arc<Process>, origin: &str) {
    let handle = ProcessHandle::new(Arc::clone(process)).to_value();
    let env = Arc::clone(process.environment());

    debug!(
        process = %process.id(),
        callback = %process.callback().name(),
        "Invoking {} callback",
        origin
    );

    match process.callback().apply_without_eval(vec![handle], env).await {
        Ok(result) => {
            debug!(process = %process.id(), result = %result, "{} callback completed", origin);
        }
        Err(e) => {
            warn!(process = %process.id(), error = %e, "error in {} process: {}", origin, e);
        }
    }
}
