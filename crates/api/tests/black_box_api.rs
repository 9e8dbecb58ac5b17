use std::sync::Arc;

use chrono::Duration;
use reqwest::StatusCode;
use serde_json::{Value, json};

use authgate_api::app::{AppServices, build_app_with_services};
use authgate_api::config::ApiConfig;
use authgate_core::SessionId;
use authgate_directory::{InMemoryUserDirectory, NewUser, UserDirectory, UserSnapshot};
use authgate_tokens::TokenCodec;

struct TestServer {
    base_url: String,
    directory: Arc<InMemoryUserDirectory>,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Build the production router around a directory handle the test keeps,
    /// bound to an ephemeral port.
    async fn spawn() -> Self {
        let config = ApiConfig {
            bind: String::new(),
            jwt_secret: "test-secret".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(14),
        };
        let directory = Arc::new(InMemoryUserDirectory::new());
        let services = Arc::new(AppServices::new(
            Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())),
            Arc::clone(&directory) as Arc<dyn UserDirectory>,
            &config,
        ));
        let app = build_app_with_services(Arc::clone(&services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            directory,
            services,
            handle,
        }
    }

    fn seed_alice(&self, permissions: &[&str]) -> UserSnapshot {
        let snapshot = self
            .directory
            .register(NewUser {
                email: "alice@example.com".to_string(),
                password: "correct horse".to_string(),
                display_name: "Alice".to_string(),
            })
            .unwrap();
        for p in permissions {
            self.directory.grant(snapshot.id, p).unwrap();
        }
        snapshot
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, base_url: &str) -> Value {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "correct horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn register_login_and_profile() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "email": "bob@example.com",
            "password": "hunter2hunter2",
            "display_name": "Bob"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "bob@example.com");
    assert!(body["access_token"].as_str().is_some());

    let res = client
        .get(format!("{}/auth/profile", srv.base_url))
        .bearer_auth(body["access_token"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let profile: Value = res.json().await.unwrap();
    assert_eq!(profile["user"]["display_name"], "Bob");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let srv = TestServer::spawn().await;
    srv.seed_alice(&[]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({
            "email": "alice@example.com",
            "password": "hunter2hunter2",
            "display_name": "Other Alice"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn refresh_rotates_and_old_token_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.seed_alice(&[]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let old_refresh = session["refresh_token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .bearer_auth(&old_refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rotated: Value = res.json().await.unwrap();
    let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, old_refresh);

    // Replay of the rotated-out token.
    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .bearer_auth(&old_refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The new token still works.
    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .bearer_auth(&new_refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_for_a_deleted_account_does_not_consume_the_credential() {
    let srv = TestServer::spawn().await;
    let alice = srv.seed_alice(&[]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let refresh = session["refresh_token"].as_str().unwrap().to_string();
    let session_id: SessionId = session["session_id"].as_str().unwrap().parse().unwrap();

    srv.directory.remove(alice.id).unwrap();

    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .bearer_auth(&refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // The rejected attempt must not have rotated the binding out from under
    // the caller: the presented token is still the session's live credential.
    let pair = srv.services.sessions.refresh(session_id, &refresh).unwrap();
    assert_ne!(pair.refresh_token, refresh);
}

#[tokio::test]
async fn check_access_omits_user_when_the_account_is_gone() {
    let srv = TestServer::spawn().await;
    let alice = srv.seed_alice(&["orders.read"]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let access = session["access_token"].as_str().unwrap().to_string();

    srv.directory.remove(alice.id).unwrap();

    let res = client
        .post(format!("{}/auth/check-access", srv.base_url))
        .bearer_auth(&access)
        .json(&json!({ "permissions": ["orders.read"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], false);
    // Absent, not null.
    assert!(body.get("user").is_none());
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let srv = TestServer::spawn().await;
    srv.seed_alice(&[]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let access = session["access_token"].as_str().unwrap();
    let refresh = session["refresh_token"].as_str().unwrap();

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .bearer_auth(refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_failures_share_one_external_message() {
    let srv = TestServer::spawn().await;
    srv.seed_alice(&[]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let access = session["access_token"].as_str().unwrap();

    // Missing credential, garbage credential, wrong-kind credential, wrong
    // password: all the same body.
    let mut bodies = Vec::new();
    let res = client
        .get(format!("{}/auth/profile", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    bodies.push(res.json::<Value>().await.unwrap());

    let res = client
        .get(format!("{}/auth/profile", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    bodies.push(res.json::<Value>().await.unwrap());

    // An access token presented to the refresh route.
    let res = client
        .post(format!("{}/auth/refresh", srv.base_url))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    bodies.push(res.json::<Value>().await.unwrap());

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    bodies.push(res.json::<Value>().await.unwrap());

    for body in &bodies[1..] {
        assert_eq!(body, &bodies[0]);
    }
}

#[tokio::test]
async fn check_access_allows_and_denies() {
    let srv = TestServer::spawn().await;
    srv.seed_alice(&["orders.read", "orders.write"]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let access = session["access_token"].as_str().unwrap();

    // AND over two groups, both satisfied.
    let res = client
        .post(format!("{}/auth/check-access", srv.base_url))
        .bearer_auth(access)
        .json(&json!({
            "groups": [
                { "permissions": ["orders.read"] },
                { "permissions": ["orders.write"] }
            ],
            "logic": "AND"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);
    assert_eq!(body["user"]["email"], "alice@example.com");

    // Deny is still 200 with allowed=false and a reason naming the gap.
    let res = client
        .post(format!("{}/auth/check-access", srv.base_url))
        .bearer_auth(access)
        .json(&json!({ "permissions": ["orders.admin"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], false);
    assert!(body["reason"].as_str().unwrap().contains("orders.admin"));

    // OR rescues an unsatisfied group.
    let res = client
        .post(format!("{}/auth/check-access", srv.base_url))
        .bearer_auth(access)
        .json(&json!({
            "groups": [{ "permissions": ["nope"] }],
            "permissions": ["orders.read"],
            "logic": "OR"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);

    // Empty request: no constraints means allow.
    let res = client
        .post(format!("{}/auth/check-access", srv.base_url))
        .bearer_auth(access)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);
    assert!(body["reason"].as_str().unwrap().contains("no permissions required"));
}

#[tokio::test]
async fn malformed_logic_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    srv.seed_alice(&[]);
    let client = reqwest::Client::new();

    let session = login(&client, &srv.base_url).await;
    let access = session["access_token"].as_str().unwrap();

    let res = client
        .post(format!("{}/auth/check-access", srv.base_url))
        .bearer_auth(access)
        .json(&json!({ "logic": "XOR" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
