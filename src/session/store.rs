//! Session store: the single owner of the client-side auth state.
//!
//! DESIGN
//! ======
//! The current `Session` lives inside a `watch` channel so observers can
//! await changes. Every transition runs inside `send_if_modified`, i.e.
//! under the channel's write lock, so check-and-set is atomic: when two
//! expiry signals race, exactly one sees an authenticated session and wins
//! the latch; the other observes `session_expired == true` and is a no-op
//! until `complete_redirect` resets the state.
//!
//! Events are broadcast from inside the same critical section, so their
//! order matches the order of state changes.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use super::user::UserProfile;

const EVENT_CAPACITY: usize = 32;

/// Snapshot of the auth state, as read by components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
    pub session_expired: bool,
    pub inactivity_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated,
    InactivityWarning,
    Expired,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.session_expired {
            SessionPhase::Expired
        } else if !self.is_authenticated {
            SessionPhase::Anonymous
        } else if self.inactivity_warning {
            SessionPhase::InactivityWarning
        } else {
            SessionPhase::Authenticated
        }
    }
}

/// Why a session ended without the user logging out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// A request through the intercepted client got 401.
    Unauthorized,
    /// No activity for the hard inactivity limit.
    InactivityTimeout,
}

/// Transitions, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserProfile),
    InactivityWarning,
    ActivityResumed,
    Expired(ExpiryReason),
    /// Post-expiry redirect finished; state is anonymous again.
    Reset,
    LoggedOut,
}

struct StoreInner {
    state: watch::Sender<Session>,
    events: broadcast::Sender<SessionEvent>,
}

/// Handle to the session. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { inner: Arc::new(StoreInner { state, events }) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    /// Stream of transitions from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Watch the full snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// `ANONYMOUS → AUTHENTICATED`. Refused while an expiry is being handled;
    /// replacing a live session is allowed and emits a fresh `LoggedIn`.
    pub fn login(&self, user: UserProfile) -> bool {
        self.transition(|session| {
            if session.session_expired {
                return None;
            }
            *session = Session { is_authenticated: true, user: Some(user.clone()), ..Session::default() };
            Some(SessionEvent::LoggedIn(user))
        })
    }

    /// `AUTHENTICATED → INACTIVITY_WARNING`. Returns false if already warned.
    pub fn warn_inactivity(&self) -> bool {
        self.transition(|session| {
            if session.phase() != SessionPhase::Authenticated {
                return None;
            }
            session.inactivity_warning = true;
            Some(SessionEvent::InactivityWarning)
        })
    }

    /// `INACTIVITY_WARNING → AUTHENTICATED`.
    pub fn record_activity(&self) -> bool {
        self.transition(|session| {
            if session.phase() != SessionPhase::InactivityWarning {
                return None;
            }
            session.inactivity_warning = false;
            Some(SessionEvent::ActivityResumed)
        })
    }

    /// Any authenticated phase `→ EXPIRED`. Returns true only for the caller
    /// that closed the latch.
    pub fn expire(&self, reason: ExpiryReason) -> bool {
        let won = self.transition(|session| {
            if !matches!(session.phase(), SessionPhase::Authenticated | SessionPhase::InactivityWarning) {
                return None;
            }
            *session = Session { session_expired: true, ..Session::default() };
            Some(SessionEvent::Expired(reason))
        });
        if won {
            tracing::info!(?reason, "session expired");
        } else {
            tracing::debug!(?reason, "expiry ignored; no live session or already handling one");
        }
        won
    }

    /// `EXPIRED → ANONYMOUS`, reopening the latch.
    pub fn complete_redirect(&self) -> bool {
        self.transition(|session| {
            if !session.session_expired {
                return None;
            }
            *session = Session::default();
            Some(SessionEvent::Reset)
        })
    }

    /// Explicit logout from any authenticated phase.
    pub fn logout(&self) -> bool {
        self.transition(|session| {
            if !session.is_authenticated {
                return None;
            }
            *session = Session::default();
            Some(SessionEvent::LoggedOut)
        })
    }

    fn transition<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut Session) -> Option<SessionEvent>,
    {
        let events = &self.inner.events;
        self.inner.state.send_if_modified(|session| match apply(session) {
            Some(event) => {
                // No subscribers is fine.
                let _ = events.send(event);
                true
            }
            None => false,
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
