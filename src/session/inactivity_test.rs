use std::time::Duration;

use super::*;
use crate::session::signal::expiry_channel;
use crate::session::store::{SessionEvent, SessionPhase};
use crate::session::test_helpers::user_with_role;

fn timings() -> SessionTimings {
    SessionTimings {
        warn_after: Duration::from_secs(10),
        expire_after: Duration::from_secs(20),
        ..SessionTimings::default()
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn warns_once_per_period_and_rearms_on_activity() {
    let store = SessionStore::new();
    let (tx, mut rx) = expiry_channel();
    let detector = InactivityDetector::spawn(store.clone(), tx, timings());
    let mut events = store.subscribe();
    store.login(user_with_role("USER"));

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);

    tokio::time::sleep(Duration::from_secs(5)).await;
    detector.touch();
    settle().await;
    assert_eq!(store.phase(), SessionPhase::Authenticated);

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);
    assert!(rx.try_recv().is_none(), "activity should have pushed the hard limit back");

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            SessionEvent::LoggedIn(user_with_role("USER")),
            SessionEvent::InactivityWarning,
            SessionEvent::ActivityResumed,
            SessionEvent::InactivityWarning,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn activity_before_warning_postpones_it() {
    let store = SessionStore::new();
    let (tx, _rx) = expiry_channel();
    let detector = InactivityDetector::spawn(store.clone(), tx, timings());
    store.login(user_with_role("USER"));

    for _ in 0..5 {
        tokio::time::sleep(Duration::from_secs(8)).await;
        detector.touch();
        settle().await;
    }
    assert_eq!(store.phase(), SessionPhase::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn hard_limit_reports_inactivity_timeout_once() {
    let store = SessionStore::new();
    let (tx, mut rx) = expiry_channel();
    let _detector = InactivityDetector::spawn(store.clone(), tx, timings());
    store.login(user_with_role("ADMIN"));

    tokio::time::sleep(Duration::from_secs(21)).await;
    assert_eq!(rx.try_recv(), Some(ExpiryReason::InactivityTimeout));

    // Nobody handled the expiry; the detector must not keep re-firing.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(rx.try_recv(), None);
}

#[tokio::test(start_paused = true)]
async fn logout_stops_the_countdown_and_login_restarts_it() {
    let store = SessionStore::new();
    let (tx, mut rx) = expiry_channel();
    let _detector = InactivityDetector::spawn(store.clone(), tx, timings());
    store.login(user_with_role("USER"));

    tokio::time::sleep(Duration::from_secs(5)).await;
    store.logout();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(rx.try_recv(), None);
    assert_eq!(store.phase(), SessionPhase::Anonymous);

    store.login(user_with_role("USER"));
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_detector_cancels_timers() {
    let store = SessionStore::new();
    let (tx, mut rx) = expiry_channel();
    let detector = InactivityDetector::spawn(store.clone(), tx, timings());
    store.login(user_with_role("USER"));
    settle().await;

    drop(detector);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    assert_eq!(rx.try_recv(), None);
}

#[tokio::test(start_paused = true)]
async fn relogin_over_live_session_restarts_countdown() {
    let store = SessionStore::new();
    let (tx, mut rx) = expiry_channel();
    let _detector = InactivityDetector::spawn(store.clone(), tx, timings());
    store.login(user_with_role("USER"));

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);

    assert!(store.login(user_with_role("ADMIN")));
    settle().await;
    assert_eq!(store.phase(), SessionPhase::Authenticated);

    // Past the first session's hard limit, well within the new one's.
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(rx.try_recv(), None);
    assert_eq!(store.phase(), SessionPhase::Authenticated);

    // The new session gets its own warning, then its own expiry.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(rx.try_recv(), Some(ExpiryReason::InactivityTimeout));
}

#[tokio::test(start_paused = true)]
async fn touches_while_signed_out_do_not_carry_over() {
    let store = SessionStore::new();
    let (tx, _rx) = expiry_channel();
    let detector = InactivityDetector::spawn(store.clone(), tx, timings());

    for _ in 0..10_000 {
        detector.touch();
    }

    tokio::time::sleep(Duration::from_secs(5)).await;
    store.login(user_with_role("USER"));
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.phase(), SessionPhase::InactivityWarning);
}
