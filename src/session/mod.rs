//! Client-side auth/session lifecycle.
//!
//! ARCHITECTURE
//! ============
//! ```text
//!   PortalClient ──401──┐
//!   InactivityDetector ─┼──> expiry channel ──> SessionMonitor ──> SessionStore
//!   SessionProbe ───────┘                            │                  │
//!                                                Navigator        events│
//!                                                                       v
//!                                                          NotificationRelay ──> Notifier
//! ```
//! `SessionStore` is the only mutable state and exposes transitions only.
//! Detectors report on the channel; the monitor applies; the relay renders.
//! `SessionRuntime` wires the default set together and tears it all down on drop.

pub mod inactivity;
pub mod monitor;
pub mod notify;
pub mod signal;
pub mod store;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

pub use inactivity::InactivityDetector;
pub use monitor::{Navigator, ProbeOutcome, SessionMonitor, SessionProbe};
pub use notify::{NotificationRelay, Notifier, Toast, ToastKind};
pub use signal::{ExpiryReceiver, ExpirySender, expiry_channel};
pub use store::{ExpiryReason, Session, SessionEvent, SessionPhase, SessionStore};
pub use user::{Role, RoleInfo, UserProfile};

pub const LOGIN_PATH: &str = "/login";

pub const DEFAULT_WARN_AFTER: Duration = Duration::from_secs(25 * 60);
pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Timer settings for the lifecycle. `warn_after` must be shorter than
/// `expire_after` for the warning to be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub warn_after: Duration,
    pub expire_after: Duration,
    pub redirect_delay: Duration,
    pub probe_interval: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            warn_after: DEFAULT_WARN_AFTER,
            expire_after: DEFAULT_EXPIRE_AFTER,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        }
    }
}

/// Running lifecycle: detector, monitor (with optional probe) and relay.
pub struct SessionRuntime {
    pub store: SessionStore,
    expiry: ExpirySender,
    detector: InactivityDetector,
    _monitor: SessionMonitor,
    _relay: NotificationRelay,
}

impl SessionRuntime {
    #[must_use]
    pub fn start(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        probe: Option<Arc<dyn SessionProbe>>,
        timings: SessionTimings,
    ) -> Self {
        let (expiry, signals) = expiry_channel();
        let relay = NotificationRelay::spawn(&store, notifier);
        let mut monitor = SessionMonitor::spawn(store.clone(), signals, navigator, timings);
        if let Some(probe) = probe {
            monitor = monitor.with_probe(store.clone(), probe, expiry.clone(), timings.probe_interval);
        }
        let detector = InactivityDetector::spawn(store.clone(), expiry.clone(), timings);
        Self { store, expiry, detector, _monitor: monitor, _relay: relay }
    }

    /// Sender for request interceptors.
    #[must_use]
    pub fn expiry_sender(&self) -> ExpirySender {
        self.expiry.clone()
    }

    /// Report user interaction to the inactivity detector.
    pub fn touch(&self) {
        self.detector.touch();
    }
}
