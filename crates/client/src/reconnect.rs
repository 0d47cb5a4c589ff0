//! Fixed-delay reconnect scheduling for the status channel.
//!
//! After the channel closes, [`ReconnectTimer::schedule`] arms one
//! delayed wake-up. At most one attempt is ever pending: scheduling
//! again before the pending one is acknowledged or cancelled does
//! nothing. There is no backoff and no attempt limit.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Delay between a closure and the next connection attempt.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

/// A single cancellable, delayed reconnect trigger.
pub struct ReconnectTimer {
    delay: Duration,
    wake: mpsc::Sender<()>,
    /// Cancels the armed attempt's sleeper task.
    pending: Option<CancellationToken>,
}

impl ReconnectTimer {
    /// Each fired attempt sends one `()` on `wake`.
    pub fn new(delay: Duration, wake: mpsc::Sender<()>) -> Self {
        Self {
            delay,
            wake,
            pending: None,
        }
    }

    /// Whether an attempt is armed and not yet acknowledged.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Arm a reconnect attempt. Returns `false` if one is already pending.
    pub fn schedule(&mut self) -> bool {
        if self.is_pending() {
            tracing::debug!("Reconnect already pending");
            return false;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let wake = self.wake.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = wake.send(()).await;
                }
            }
        });

        tracing::info!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        self.pending = Some(cancel);
        true
    }

    /// Mark the pending attempt as consumed after its wake-up arrived.
    pub fn acknowledge(&mut self) {
        self.pending = None;
    }

    /// Drop any pending attempt without firing it.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.pending.take() {
            cancel.cancel();
        }
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
