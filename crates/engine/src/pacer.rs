use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Spaces out the start of gateway requests by a fixed interval.
///
/// Callers reserve the next free slot under a short lock and sleep outside it.
#[derive(Debug)]
pub struct SubmitPacer {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl SubmitPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Wait for this caller's turn to submit a request.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.interval;
            slot
        };

        let delay = slot.saturating_duration_since(Instant::now());
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Pacing request");
            tokio::time::sleep_until(slot).await;
        }
    }
}
