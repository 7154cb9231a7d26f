//! Session monitor: the single consumer of expiry signals.
//!
//! Each signal is turned into `SessionStore::expire`. Only the signal that
//! wins the store's latch schedules the redirect; the rest are dropped. The
//! monitor handles signals one at a time, so signals that queue up during
//! the redirect delay find an already-expired (then reset) session and are
//! no-ops.
//!
//! Optionally, a probe periodically asks the backend whether the session is
//! still valid and reports `Unauthorized` on the same channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::signal::{ExpiryReceiver, ExpirySender};
use super::store::{ExpiryReason, SessionStore};
use super::{LOGIN_PATH, SessionTimings};

/// Page navigation (router push, window location, test recorder).
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn redirect(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Valid,
    Unauthorized,
    /// Backend unreachable or erroring; says nothing about the session.
    Unavailable,
}

/// Out-of-band session validity check.
#[async_trait]
pub trait SessionProbe: Send + Sync {
    async fn check(&self) -> ProbeOutcome;
}

pub struct SessionMonitor {
    task: JoinHandle<()>,
    probe: Option<JoinHandle<()>>,
}

impl SessionMonitor {
    #[must_use]
    pub fn spawn(
        store: SessionStore,
        signals: ExpiryReceiver,
        navigator: Arc<dyn Navigator>,
        timings: SessionTimings,
    ) -> Self {
        let task = tokio::spawn(handle_signals(store, signals, navigator, timings.redirect_delay));
        Self { task, probe: None }
    }

    /// Also poll `probe` every `interval` while the session is authenticated.
    #[must_use]
    pub fn with_probe(
        mut self,
        store: SessionStore,
        probe: Arc<dyn SessionProbe>,
        signals: ExpirySender,
        interval: Duration,
    ) -> Self {
        if let Some(previous) = self.probe.take() {
            previous.abort();
        }
        self.probe = Some(tokio::spawn(run_probe(store, probe, signals, interval)));
        self
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(probe) = &self.probe {
            probe.abort();
        }
    }
}

async fn handle_signals(
    store: SessionStore,
    mut signals: ExpiryReceiver,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
) {
    while let Some(reason) = signals.recv().await {
        if !store.expire(reason) {
            continue;
        }
        // Give the toast time to show before leaving the page.
        tokio::time::sleep(redirect_delay).await;
        navigator.redirect(LOGIN_PATH).await;
        store.complete_redirect();
        tracing::info!(?reason, path = LOGIN_PATH, "redirected after session expiry");
    }
}

async fn run_probe(store: SessionStore, probe: Arc<dyn SessionProbe>, signals: ExpirySender, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the session was just checked by login.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if !store.snapshot().is_authenticated {
            continue;
        }
        match probe.check().await {
            ProbeOutcome::Valid => {}
            ProbeOutcome::Unauthorized => {
                tracing::info!("session probe rejected; reporting expiry");
                if !signals.notify(ExpiryReason::Unauthorized) {
                    return;
                }
            }
            ProbeOutcome::Unavailable => tracing::warn!("session probe could not reach the backend"),
        }
    }
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;
