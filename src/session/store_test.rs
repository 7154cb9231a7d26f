use super::*;
use crate::session::test_helpers::user_with_role;

fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn new_store_is_anonymous() {
    let store = SessionStore::new();
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert_eq!(store.snapshot(), Session::default());
}

#[test]
fn login_sets_user_and_flag() {
    let store = SessionStore::new();
    let mut rx = store.subscribe();
    assert!(store.login(user_with_role("USER")));

    let session = store.snapshot();
    assert!(session.is_authenticated);
    assert_eq!(session.user.as_ref().map(|u| u.role.code.as_str()), Some("USER"));
    assert_eq!(drain(&mut rx), vec![SessionEvent::LoggedIn(user_with_role("USER"))]);
}

#[test]
fn warning_fires_once_until_activity() {
    let store = SessionStore::new();
    store.login(user_with_role("USER"));
    let mut rx = store.subscribe();

    assert!(store.warn_inactivity());
    assert!(!store.warn_inactivity());
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);

    assert!(store.record_activity());
    assert!(!store.record_activity());
    assert_eq!(store.phase(), SessionPhase::Authenticated);

    assert!(store.warn_inactivity());
    assert_eq!(
        drain(&mut rx),
        vec![SessionEvent::InactivityWarning, SessionEvent::ActivityResumed, SessionEvent::InactivityWarning]
    );
}

#[test]
fn warning_requires_live_session() {
    let store = SessionStore::new();
    assert!(!store.warn_inactivity());
    assert_eq!(store.phase(), SessionPhase::Anonymous);
}

#[test]
fn expire_clears_user_and_latches() {
    let store = SessionStore::new();
    store.login(user_with_role("ADMIN"));
    let mut rx = store.subscribe();

    assert!(store.expire(ExpiryReason::Unauthorized));
    assert!(!store.expire(ExpiryReason::Unauthorized));
    assert!(!store.expire(ExpiryReason::InactivityTimeout));

    let session = store.snapshot();
    assert!(session.user.is_none());
    assert!(!session.is_authenticated);
    assert!(session.session_expired);
    assert_eq!(drain(&mut rx), vec![SessionEvent::Expired(ExpiryReason::Unauthorized)]);
}

#[test]
fn expire_from_warning_state_clears_warning() {
    let store = SessionStore::new();
    store.login(user_with_role("USER"));
    store.warn_inactivity();
    assert!(store.expire(ExpiryReason::InactivityTimeout));
    assert!(!store.snapshot().inactivity_warning);
}

#[test]
fn expire_while_anonymous_is_noop() {
    let store = SessionStore::new();
    let mut rx = store.subscribe();
    assert!(!store.expire(ExpiryReason::Unauthorized));
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn login_refused_until_redirect_completes() {
    let store = SessionStore::new();
    store.login(user_with_role("USER"));
    store.expire(ExpiryReason::Unauthorized);

    assert!(!store.login(user_with_role("USER")));
    assert!(store.complete_redirect());
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert!(!store.complete_redirect());

    assert!(store.login(user_with_role("USER")));
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    // Latch is open again.
    assert!(store.expire(ExpiryReason::Unauthorized));
}

#[test]
fn logout_resets_without_expiry() {
    let store = SessionStore::new();
    store.login(user_with_role("SADMIN"));
    let mut rx = store.subscribe();

    assert!(store.logout());
    assert!(!store.logout());
    assert_eq!(store.snapshot(), Session::default());
    assert_eq!(drain(&mut rx), vec![SessionEvent::LoggedOut]);
}

#[test]
fn concurrent_expiry_has_single_winner() {
    let store = SessionStore::new();
    store.login(user_with_role("USER"));
    let mut rx = store.subscribe();

    let winners: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| store.expire(ExpiryReason::Unauthorized)))
            .collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().expect("thread should not panic")))
            .sum()
    });

    assert_eq!(winners, 1);
    assert_eq!(drain(&mut rx).len(), 1);
}

#[tokio::test]
async fn watchers_see_transitions() {
    let store = SessionStore::new();
    let mut watch = store.watch();
    store.login(user_with_role("USER"));
    watch.changed().await.unwrap();
    assert!(watch.borrow_and_update().is_authenticated);
}
