use super::*;
use crate::routes::app;
use crate::state::test_helpers::{spawn_router, spawn_upstream, test_app_state, unreachable_app_state};
use axum::http::HeaderMap;

fn set_cookies(headers: &reqwest::header::HeaderMap) -> Vec<String> {
    headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

// =============================================================================
// helpers
// =============================================================================

#[test]
fn token_from_jar_reads_access_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert("cookie", "theme=dark; access_token=tok-1".parse().unwrap());
    let jar = CookieJar::from_headers(&headers);
    assert_eq!(token_from_jar(&jar).as_deref(), Some("tok-1"));
}

#[test]
fn token_from_jar_ignores_blank_token() {
    let mut headers = HeaderMap::new();
    headers.insert("cookie", "access_token=   ".parse().unwrap());
    let jar = CookieJar::from_headers(&headers);
    assert!(token_from_jar(&jar).is_none());
}

#[test]
fn login_tokens_accepts_camel_and_snake_case() {
    let camel = json!({ "accessToken": "a1", "refreshToken": "r1" });
    assert_eq!(login_tokens(&camel), Some(("a1".to_owned(), Some("r1".to_owned()))));

    let snake = json!({ "access_token": "a2" });
    assert_eq!(login_tokens(&snake), Some(("a2".to_owned(), None)));

    assert_eq!(login_tokens(&json!({ "token": "" })), None);
    assert_eq!(login_tokens(&json!({ "user": {} })), None);
}

#[test]
fn unwrap_data_strips_envelope_only_when_present() {
    assert_eq!(unwrap_data(json!({ "data": { "id": 1 } })), json!({ "id": 1 }));
    assert_eq!(unwrap_data(json!({ "id": 1 })), json!({ "id": 1 }));
    assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_sets_http_only_cookies_and_returns_user() {
    let upstream_body = json!({
        "accessToken": "tok-new",
        "refreshToken": "ref-new",
        "user": { "id": "u1", "role": { "code": "ADMIN" } }
    });
    let (upstream, hits) = spawn_upstream(200, upstream_body).await;
    let base = spawn_router(app(test_app_state(&upstream))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "agent@cei.ci", "password": "secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookies = set_cookies(response.headers());
    assert!(cookies.iter().any(|c| c.starts_with("access_token=tok-new") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=ref-new")));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["role"]["code"], "ADMIN");

    let seen = hits.last().unwrap();
    assert_eq!(seen.path, "/auth/login");
    assert!(seen.authorization.is_none());
}

#[tokio::test]
async fn login_with_invalid_payload_never_reaches_backend() {
    let (upstream, hits) = spawn_upstream(200, json!({})).await;
    let base = spawn_router(app(test_app_state(&upstream))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "pas-un-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"].as_array().map(Vec::len), Some(2));
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn login_rejected_upstream_keeps_status_and_message() {
    let (upstream, _hits) = spawn_upstream(401, json!({ "message": "Identifiants invalides" })).await;
    let base = spawn_router(app(test_app_state(&upstream))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": "agent@cei.ci", "password": "faux" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert!(set_cookies(response.headers()).is_empty());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Identifiants invalides");
}

// =============================================================================
// me / token
// =============================================================================

#[tokio::test]
async fn me_wraps_profile_in_user_key() {
    let profile = json!({ "data": { "id": "u1", "role": { "code": "SADMIN" } } });
    let (upstream, hits) = spawn_upstream(200, profile).await;
    let base = spawn_router(app(test_app_state(&upstream))).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/auth/me"))
        .header("cookie", "access_token=tok-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["role"]["code"], "SADMIN");

    let seen = hits.last().unwrap();
    assert_eq!(seen.path, "/auth/profile");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer tok-abc"));
}

#[tokio::test]
async fn token_returns_cookie_value_without_backend() {
    let base = spawn_router(app(unreachable_app_state())).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/auth/token"))
        .header("cookie", "access_token=tok-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "token": "tok-abc" }));
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_cookies_even_when_backend_is_down() {
    let base = spawn_router(app(unreachable_app_state())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/logout"))
        .header("cookie", "access_token=tok-abc; refresh_token=ref-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookies = set_cookies(response.headers());
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        assert!(
            cookies
                .iter()
                .any(|c| c.starts_with(&format!("{name}=;")) && c.contains("Max-Age=0")),
            "expected {name} to be cleared, got {cookies:?}"
        );
    }
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn logout_clears_cookies_when_backend_rejects() {
    let (upstream, hits) = spawn_upstream(500, json!({ "message": "boom" })).await;
    let base = spawn_router(app(test_app_state(&upstream))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/logout"))
        .header("cookie", "access_token=tok-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(hits.last().unwrap().path, "/auth/logout");
    assert!(!set_cookies(response.headers()).is_empty());
}

#[tokio::test]
async fn logout_without_token_skips_backend() {
    let (upstream, hits) = spawn_upstream(200, json!({})).await;
    let base = spawn_router(app(test_app_state(&upstream))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(hits.count(), 0);

    let cookies = set_cookies(response.headers());
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        assert!(cookies.iter().any(|c| c.starts_with(&format!("{name}=;"))), "expected {name} cleared");
    }
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}
