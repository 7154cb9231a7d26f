//! Toast notifications driven by session transitions.
//!
//! The relay only listens to store events. Because the store emits each
//! transition exactly once (the expiry latch in particular), the relay can
//! map events to toasts one-to-one without its own de-duplication.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::store::{ExpiryReason, SessionEvent, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

impl Toast {
    fn new(kind: ToastKind, title: &str, message: &str) -> Self {
        Self { kind, title: title.to_owned(), message: message.to_owned() }
    }
}

/// Sink for toasts (UI layer, terminal, test recorder).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, toast: Toast);
}

/// Toast for a transition, if it warrants one.
#[must_use]
pub fn toast_for(event: &SessionEvent) -> Option<Toast> {
    match event {
        SessionEvent::LoggedIn(user) => Some(Toast::new(
            ToastKind::Success,
            "Connexion réussie",
            &format!("Bienvenue, {}", user.display_name()),
        )),
        SessionEvent::InactivityWarning => Some(Toast::new(
            ToastKind::Warning,
            "Inactivité détectée",
            "Votre session va bientôt expirer. Effectuez une action pour rester connecté.",
        )),
        SessionEvent::Expired(ExpiryReason::Unauthorized) => Some(Toast::new(
            ToastKind::Error,
            "Session expirée",
            "Votre session a expiré. Veuillez vous reconnecter.",
        )),
        SessionEvent::Expired(ExpiryReason::InactivityTimeout) => Some(Toast::new(
            ToastKind::Error,
            "Session expirée",
            "Vous avez été déconnecté pour inactivité. Veuillez vous reconnecter.",
        )),
        SessionEvent::ActivityResumed | SessionEvent::Reset | SessionEvent::LoggedOut => None,
    }
}

pub struct NotificationRelay {
    task: JoinHandle<()>,
}

impl NotificationRelay {
    #[must_use]
    pub fn spawn(store: &SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        let mut events = store.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(toast) = toast_for(&event) {
                            notifier.notify(toast).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification relay lagged behind session events");
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        });
        Self { task }
    }
}

impl Drop for NotificationRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
