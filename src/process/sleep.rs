/*!
 * Sleep / Wake
 * Bounded suspension of a path until its process is woken or time runs out
 */

use super::signal::Delivery;
use super::types::Process;
use crate::core::types::{millis_to_duration, Millis};
use tracing::debug;

impl Process {
    /// Suspend until woken (`true`) or until `millis` elapse (`false`)
    ///
    /// A wake that is already waiting in the slot wins immediately.
    pub async fn sleep(&self, millis: Millis) -> bool {
        let timeout = tokio::time::sleep(millis_to_duration(millis));

        let woken = tokio::select! {
            biased;
            event = async { self.wake_rx.lock().await.recv().await } => event.is_some(),
            _ = timeout => false,
        };

        debug!(process = %self.id(), millis, woken, "Sleep finished");
        woken
    }

    /// Deliver one wake event, waiting while a previous one is undelivered
    pub async fn wake(&self) -> Delivery {
        let delivery = self.wake_tx.deliver().await;
        debug!(process = %self.id(), ?delivery, "Wake delivered");
        delivery
    }
}
