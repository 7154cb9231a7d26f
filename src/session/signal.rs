//! Expiry signal channel between request interceptors and the session monitor.
//!
//! Producers (the intercepted client, the inactivity detector, the session
//! probe) only report; they never touch the store. The monitor is the single
//! consumer and applies the transition.

use tokio::sync::mpsc;

use super::store::ExpiryReason;

#[must_use]
pub fn expiry_channel() -> (ExpirySender, ExpiryReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ExpirySender(tx), ExpiryReceiver(rx))
}

#[derive(Debug, Clone)]
pub struct ExpirySender(mpsc::UnboundedSender<ExpiryReason>);

impl ExpirySender {
    /// Report an expiry. Returns false if the monitor is gone.
    pub fn notify(&self, reason: ExpiryReason) -> bool {
        self.0.send(reason).is_ok()
    }
}

#[derive(Debug)]
pub struct ExpiryReceiver(mpsc::UnboundedReceiver<ExpiryReason>);

impl ExpiryReceiver {
    pub async fn recv(&mut self) -> Option<ExpiryReason> {
        self.0.recv().await
    }

    /// Non-blocking receive, mostly for tests.
    pub fn try_recv(&mut self) -> Option<ExpiryReason> {
        self.0.try_recv().ok()
    }
}
