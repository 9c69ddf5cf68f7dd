//! End-to-end HTTP tests: the server is bound to an ephemeral port and
//! exercised with reqwest. Session cookies are carried by hand because the
//! cookie is marked Secure and these tests run over plain http.

use std::net::SocketAddr;

use anyhow::Result;
use serde_json::{json, Value};

use otogift_auth::config::{Config, FederatedProvider};
use otogift_auth::server::{router, AppState};
use otogift_auth::tprintln;

async fn serve(config: Config) -> Result<SocketAddr> {
    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tprintln!("test server listening on {}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tprintln!("test server error: {e}");
        }
    });
    Ok(addr)
}

async fn serve_default() -> Result<(reqwest::Client, String)> {
    let addr = serve(Config::default()).await?;
    Ok((reqwest::Client::new(), format!("http://{}", addr)))
}

fn session_token(resp: &reqwest::Response) -> Option<String> {
    let raw = resp.headers().get("set-cookie")?.to_str().ok()?;
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    (name == "otogift_session").then(|| value.to_string())
}

#[tokio::test]
async fn register_then_conflict() -> Result<()> {
    let (client, base) = serve_default().await?;

    let body = json!({"email": "a@b.com", "password": "abcdef", "name": "Taro"});
    let resp = client.post(format!("{base}/api/auth/register")).json(&body).send().await?;
    assert_eq!(resp.status(), 200);
    let v: Value = resp.json().await?;
    assert_eq!(v["user"]["email"], "a@b.com");
    assert_eq!(v["user"]["name"], "Taro");
    assert!(v["user"]["id"].as_str().unwrap_or_default().starts_with("cred_"));

    let resp = client.post(format!("{base}/api/auth/register")).json(&body).send().await?;
    assert_eq!(resp.status(), 409);
    let v: Value = resp.json().await?;
    assert!(v["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn register_rejects_short_password_and_missing_fields() -> Result<()> {
    let (client, base) = serve_default().await?;

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": "a@b.com", "password": "ab", "name": "Taro"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);
    let v: Value = resp.json().await?;
    assert!(v["error"].as_str().unwrap_or_default().contains('6'), "error mentions the 6-character minimum: {v}");

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": "a@b.com", "password": "abcdef"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);
    Ok(())
}

#[tokio::test]
async fn login_issues_session_and_opens_the_studio() -> Result<()> {
    let (client, base) = serve_default().await?;

    client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": "a@b.com", "password": "abcdef", "name": "Taro"}))
        .send()
        .await?;

    // Protected view before sign-in: the default prompt, never the content.
    let resp = client.get(format!("{base}/api/studio")).send().await?;
    assert_eq!(resp.status(), 401);
    let v: Value = resp.json().await?;
    assert_eq!(v["error"], "sign in required");

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "abcdef"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let token = session_token(&resp).expect("session cookie set on login");

    let resp = client
        .get(format!("{base}/api/studio"))
        .header("cookie", format!("otogift_session={token}"))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let v: Value = resp.json().await?;
    assert_eq!(v["studio"], "ready");
    assert_eq!(v["user"]["name"], "Taro");

    // Session read carries the enriched claims.
    let resp = client
        .get(format!("{base}/api/auth/session"))
        .header("cookie", format!("otogift_session={token}"))
        .send()
        .await?;
    let v: Value = resp.json().await?;
    assert_eq!(v["user"]["email"], "a@b.com");

    // Sign-out revokes the token.
    let resp = client
        .post(format!("{base}/api/auth/logout"))
        .header("cookie", format!("otogift_session={token}"))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let resp = client
        .get(format!("{base}/api/studio"))
        .header("cookie", format!("otogift_session={token}"))
        .send()
        .await?;
    assert_eq!(resp.status(), 401);
    Ok(())
}

#[tokio::test]
async fn login_failures_share_one_response_shape() -> Result<()> {
    let (client, base) = serve_default().await?;

    client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": "a@b.com", "password": "abcdef", "name": "Taro"}))
        .send()
        .await?;

    let wrong = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "wrong!"}))
        .send()
        .await?;
    let unknown = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ghost@b.com", "password": "abcdef"}))
        .send()
        .await?;
    assert_eq!(wrong.status(), 401);
    assert_eq!(unknown.status(), 401);
    let wrong_body: Value = wrong.json().await?;
    let unknown_body: Value = unknown.json().await?;
    assert_eq!(wrong_body, unknown_body);
    Ok(())
}

#[tokio::test]
async fn session_endpoint_reports_null_without_cookie() -> Result<()> {
    let (client, base) = serve_default().await?;
    let resp = client.get(format!("{base}/api/auth/session")).send().await?;
    assert_eq!(resp.status(), 200);
    let v: Value = resp.json().await?;
    assert!(v["user"].is_null());
    Ok(())
}

#[tokio::test]
async fn federated_callback_absent_without_provider_credentials() -> Result<()> {
    let (client, base) = serve_default().await?;
    let resp = client
        .post(format!("{base}/api/auth/federated/callback"))
        .json(&json!({"email": "g@b.com", "name": "Hana"}))
        .send()
        .await?;
    assert_eq!(resp.status(), 404);
    Ok(())
}

#[tokio::test]
async fn federated_callback_signs_in_and_is_idempotent() -> Result<()> {
    let config = Config {
        federated: Some(FederatedProvider {
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
        }),
        ..Config::default()
    };
    let addr = serve(config).await?;
    let base = format!("http://{}", addr);
    let client = reqwest::Client::new();

    let assertion = json!({"id": "prov_1", "email": "g@b.com", "name": "Hana"});
    let resp = client.post(format!("{base}/api/auth/federated/callback")).json(&assertion).send().await?;
    assert_eq!(resp.status(), 200);
    let token = session_token(&resp).expect("session cookie set");
    let first: Value = resp.json().await?;
    assert_eq!(first["user"]["id"], "prov_1");

    let resp = client.post(format!("{base}/api/auth/federated/callback")).json(&assertion).send().await?;
    assert_eq!(resp.status(), 200);
    let second: Value = resp.json().await?;
    assert_eq!(first["user"], second["user"], "second sign-in reuses the stored identity");

    // The federated session opens protected views like any other.
    let resp = client
        .get(format!("{base}/api/studio"))
        .header("cookie", format!("otogift_session={token}"))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    Ok(())
}
