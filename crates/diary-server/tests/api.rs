use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use time::Duration;
use tower::ServiceExt;

use diary_security::{Redactor, TokenSigner};
use diary_server::{AppState, DiaryServer};
use diary_storage::Storage;

const SECRET_DIARY: &str = "Public part\n:::secret\nhidden-payload-42\n:::\nAfter";

struct TestApp {
    _dir: tempfile::TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(Some(dir.path().join("api.db"))).await.unwrap();
        let state = AppState::new(
            storage,
            TokenSigner::new("integration-secret", Duration::days(30)),
            Redactor::default(),
        );
        let router = DiaryServer::new(state).router();
        Self { _dir: dir, router }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "hunter22",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create(&self, token: &str, title: &str, content: &str, is_public: bool) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/diaries",
                Some(token),
                Some(json!({ "title": title, "content": content, "isPublic": is_public })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["message"], "Diary created successfully");
        body["diary"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/_status/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_register_login_me() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"username": "alice", "email": "other@example.com", "password": "hunter22"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ALICE@example.com", "password": "hunter22"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"username": "a", "email": "not-an-email", "password": "123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_auth_required() {
    let app = TestApp::new().await;
    let (status, _) = app.call(Method::GET, "/api/diaries", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::GET, "/api/diaries", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_private_entry_read_paths() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = app.create(&alice, "Private", SECRET_DIARY, false).await;
    let uri = format!("/api/diaries/{}", id);

    let (status, body) = app.call(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["secretsRevealed"], true);
    let content = body["content"].as_str().unwrap();
    assert!(content.contains("hidden-payload-42"));
    assert!(content.contains("secret-spoiler"));

    let (status, body) = app.call(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!body.to_string().contains("hidden-payload-42"));

    let (status, _) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::GET, &format!("/api/diaries/share/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!body.to_string().contains("hidden-payload-42"));
}

#[tokio::test]
async fn test_public_entry_read_paths() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = app.create(&alice, "Public", SECRET_DIARY, true).await;
    let uri = format!("/api/diaries/{}", id);

    let (status, body) = app.call(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("hidden-payload-42"));
    assert_eq!(body["owner"]["username"], "alice");

    for token in [Some(bob.as_str()), None] {
        let (status, body) = app.call(Method::GET, &uri, token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["secretsRevealed"], false);
        let content = body["content"].as_str().unwrap();
        assert!(!content.contains("hidden-payload-42"));
        assert!(content.contains("This content is private"));
        assert!(content.starts_with("Public part\n"));
    }

    // Share links never reveal, not even to the owner
    let share = format!("/api/diaries/share/{}", id);
    let (status, body) = app.call(Method::GET, &share, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["content"].as_str().unwrap().contains("hidden-payload-42"));

    let (status, body) = app.call(Method::GET, "/api/diaries/public", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], id.as_str());
    assert!(!body.to_string().contains("hidden-payload-42"));
}

#[tokio::test]
async fn test_missing_entry_is_404() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;

    let (status, body) = app
        .call(Method::GET, "/api/diaries/does-not-exist", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Diary not found");

    let (status, _) = app
        .call(Method::GET, "/api/diaries/share/does-not-exist", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_token_on_optional_auth_is_401() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let id = app.create(&alice, "Public", "hello", true).await;

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/diaries/{}", id),
            Some("alice.1.deadbeef"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_and_delete_are_owner_only() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let id = app.create(&alice, "Mine", "body", false).await;
    let uri = format!("/api/diaries/{}", id);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&bob), Some(json!({"isPublic": true})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this diary");

    let (status, _) = app.call(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&alice),
            Some(json!({"title": "Renamed", "isPublic": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diary"]["title"], "Renamed");
    assert_eq!(body["diary"]["isPublic"], true);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&alice), Some(json!({"title": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Diary deleted successfully");

    let (status, _) = app.call(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_search_and_contributions() {
    let app = TestApp::new().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.create(&alice, "Rainy walk", SECRET_DIARY, false).await;
    app.create(&alice, "Market", "bought tea", true).await;
    app.create(&bob, "Bob walk", "walk", true).await;

    let (status, body) = app.call(Method::GET, "/api/diaries", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|d| d.get("content").is_none()));
    let rainy = list.iter().find(|d| d["title"] == "Rainy walk").unwrap();
    assert_eq!(rainy["secretCount"], 1);

    let (status, body) = app
        .call(Method::GET, "/api/diaries/search?q=walk", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "Rainy walk");

    let (status, _) = app
        .call(Method::GET, "/api/diaries/search?q=%20", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::GET,
            "/api/diaries/contributions?days=7",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 7);
    // entries may straddle midnight, so only the total is stable
    let total: u64 = days.iter().map(|d| d["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 2);

    let (status, body) = app
        .call(Method::GET, "/api/diaries/contributions", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 365);
}
