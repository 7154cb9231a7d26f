//! Inactivity detector.
//!
//! While a session is authenticated, a countdown runs from the last reported
//! activity. Past `warn_after` the store is moved to the warning phase once;
//! past `expire_after` an `InactivityTimeout` is reported on the expiry
//! channel. Any activity re-arms both deadlines and clears the warning.
//!
//! The countdown follows store events rather than snapshots: every
//! `LoggedIn` starts a fresh countdown, even when it replaces a session that
//! was still authenticated. Activity is a `watch` of the latest instant, so
//! touches while signed out overwrite each other instead of queueing.
//!
//! The countdown is a tokio task owned by the returned handle; dropping the
//! handle aborts it so no timer fires against a torn-down session.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use super::SessionTimings;
use super::signal::ExpirySender;
use super::store::{ExpiryReason, SessionEvent, SessionStore};

pub struct InactivityDetector {
    activity: watch::Sender<Instant>,
    task: JoinHandle<()>,
}

impl InactivityDetector {
    #[must_use]
    pub fn spawn(store: SessionStore, expiry: ExpirySender, timings: SessionTimings) -> Self {
        let (activity, rx) = watch::channel(Instant::now());
        // Subscribe before spawning so a login right after this call is seen.
        let events = store.subscribe();
        let task = tokio::spawn(run(store, expiry, timings, events, rx));
        Self { activity, task }
    }

    /// Report user interaction (key press, click, navigation...).
    pub fn touch(&self) {
        self.activity.send_replace(Instant::now());
    }
}

impl Drop for InactivityDetector {
    fn drop(&mut self) {
        self.task.abort();
    }
}

enum Countdown {
    /// Session ended (logout, expiry handled elsewhere, reset).
    Ended,
    /// A new login replaced the session being timed.
    Restart,
    /// Hard limit reached and reported.
    Fired,
    /// Handle dropped or store gone.
    Closed,
}

async fn run(
    store: SessionStore,
    expiry: ExpirySender,
    timings: SessionTimings,
    mut events: broadcast::Receiver<SessionEvent>,
    mut activity: watch::Receiver<Instant>,
) {
    let mut live = store.snapshot().is_authenticated;
    loop {
        if !live && !wait_for_login(&store, &mut events).await {
            return;
        }
        live = false;
        match countdown(&store, &expiry, timings, &mut events, &mut activity).await {
            Countdown::Closed => return,
            Countdown::Restart => live = true,
            // After firing, stay parked until the next login.
            Countdown::Ended | Countdown::Fired => {}
        }
    }
}

/// Wait for the next `LoggedIn`. Returns false once the store is gone.
async fn wait_for_login(store: &SessionStore, events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    loop {
        match events.recv().await {
            Ok(SessionEvent::LoggedIn(_)) => return true,
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => {
                if store.snapshot().is_authenticated {
                    return true;
                }
            }
            Err(RecvError::Closed) => return false,
        }
    }
}

async fn countdown(
    store: &SessionStore,
    expiry: &ExpirySender,
    timings: SessionTimings,
    events: &mut broadcast::Receiver<SessionEvent>,
    activity: &mut watch::Receiver<Instant>,
) -> Countdown {
    let mut last_activity = Instant::now();
    // Touches from before this session do not count.
    let _ = activity.borrow_and_update();
    let mut warned = false;

    loop {
        let warn_at = last_activity + timings.warn_after;
        let expire_at = last_activity + timings.expire_after;

        tokio::select! {
            changed = activity.changed() => {
                if changed.is_err() {
                    return Countdown::Closed;
                }
                last_activity = last_activity.max(*activity.borrow_and_update());
                if warned {
                    store.record_activity();
                    warned = false;
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::LoggedIn(_)) => return Countdown::Restart,
                Ok(SessionEvent::Expired(_) | SessionEvent::Reset | SessionEvent::LoggedOut) => {
                    return Countdown::Ended;
                }
                Ok(SessionEvent::InactivityWarning | SessionEvent::ActivityResumed) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "inactivity detector lagged behind session events");
                    return if store.snapshot().is_authenticated { Countdown::Restart } else { Countdown::Ended };
                }
                Err(RecvError::Closed) => return Countdown::Closed,
            },
            () = sleep_until(warn_at), if !warned => {
                if store.warn_inactivity() {
                    tracing::info!(after = ?timings.warn_after, "inactivity warning");
                }
                warned = true;
            }
            () = sleep_until(expire_at) => {
                tracing::info!(after = ?timings.expire_after, "inactivity limit reached");
                expiry.notify(ExpiryReason::InactivityTimeout);
                return Countdown::Fired;
            }
        }
    }
}

#[cfg(test)]
#[path = "inactivity_test.rs"]
mod tests;
