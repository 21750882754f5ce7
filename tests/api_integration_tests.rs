//! API Integration Tests
//!
//! Drives the HTTP API end to end against a real SQLite database.
//!
//! Tests are serialized because they share a global test pool.
//!
//! Note: The `more-di` DI framework doesn't support injecting custom pools.
//! We work around this by using `DatabaseConnection::set_test_pool()` to set
//! a global pool that the DI-created DatabaseConnection will use.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chatbot_studio_api::infrastructure::config::AppConfig;
use chatbot_studio_api::{app, infrastructure::database::DatabaseConnection, services};
use di_axum::RouterServiceProviderExtensions;
use serde_json::{Value, json};
use serial_test::serial;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;
use uuid::Uuid;

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Setup test database with migrations and returns pool
async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    // Use file URI format with shared cache - each test gets a unique DB
    let db_url = format!("sqlite:file:apidb{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    // Set this pool as the global test pool so DI uses it
    DatabaseConnection::set_test_pool(pool.clone());

    pool
}

/// Clean up after test
fn cleanup_test_db() {
    DatabaseConnection::clear_test_pool();
}

/// Create test app - uses the global test pool set by setup_test_db()
fn create_test_app() -> axum::Router {
    app().with_provider(services().build_provider().unwrap())
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Registers a user and returns its access and refresh tokens.
async fn register(app: &axum::Router, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": "correct horse", "name": "Owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    (
        body["tokens"]["accessToken"].as_str().unwrap().to_owned(),
        body["tokens"]["refreshToken"].as_str().unwrap().to_owned(),
    )
}

async fn create_bot(app: &axum::Router, token: &str, welcome: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/bots",
        Some(token),
        Some(json!({ "name": "Support", "welcomeMessage": welcome })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_owned()
}

async fn chat(
    app: &axum::Router,
    bot_id: &str,
    session_id: &str,
    message: &str,
) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/chat",
        None,
        Some(json!({ "botId": bot_id, "sessionId": session_id, "message": message })),
    )
    .await
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
#[serial]
async fn test_health() {
    let _pool = setup_test_db().await;
    let app = create_test_app();

    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "chatbot-studio-api");
    }

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_register_duplicate_email_conflicts() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    register(&app, "owner@example.com").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "Owner@Example.com", "password": "another pass", "name": "Eve" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.get("tokens").is_none());
    assert_eq!(count(&pool, "users").await, 1);
    assert_eq!(count(&pool, "refresh_tokens").await, 1);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_register_validates_input() {
    let pool = setup_test_db().await;
    let app = create_test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "owner@example.com", "password": "short", "name": "Owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(count(&pool, "users").await, 0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_login_me_refresh_logout() {
    let _pool = setup_test_db().await;
    let app = create_test_app();
    register(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "owner@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "owner@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["tokens"]["accessToken"].as_str().unwrap().to_owned();
    let refresh = body["tokens"]["refreshToken"].as_str().unwrap().to_owned();

    let (status, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "owner@example.com");
    assert_eq!(me["role"], "USER");
    assert!(me.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].as_str().is_some());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/logout",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_chat_with_unpublished_bot_writes_nothing() {
    let pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;
    let bot_id = create_bot(&app, &token, "Hello!").await;

    let (status, body) = chat(&app, &bot_id, "s1", "hi").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Bot not found or not published");

    let (status, _) = chat(&app, &Uuid::new_v4().to_string(), "s1", "hi").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/v1/chat/{bot_id}/config"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(count(&pool, "conversations").await, 0);
    assert_eq!(count(&pool, "messages").await, 0);
    assert_eq!(count(&pool, "analytics").await, 0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_chat_flow() {
    let pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;
    let bot_id = create_bot(&app, &token, "Welcome aboard").await;

    for (path, body) in [
        (
            "intents",
            json!({ "name": "pricing", "patterns": ["price", "cost"], "response": "See /pricing" }),
        ),
        (
            "intents",
            json!({ "name": "refund", "patterns": ["refund"], "response": "talk to sales" }),
        ),
        (
            "faqs",
            json!({ "question": "refund", "answer": "30-day refund policy" }),
        ),
    ] {
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/bots/{bot_id}/{path}"),
            Some(&token),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, published) = send(
        &app,
        Method::POST,
        &format!("/api/v1/bots/{bot_id}/publish"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["published"], true);

    let (status, config) = send(
        &app,
        Method::GET,
        &format!("/api/v1/chat/{bot_id}/config"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["welcomeMessage"], "Welcome aboard");

    let (status, first) = chat(&app, &bot_id, "s1", "what's your cost?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "See /pricing");
    assert_eq!(first["botName"], "Support");

    let (_, second) = chat(&app, &bot_id, "s1", "what is your refund policy").await;
    assert_eq!(second["message"], "30-day refund policy");
    assert_eq!(second["conversationId"], first["conversationId"]);

    let (_, third) = chat(&app, &bot_id, "s2", "good morning").await;
    assert_eq!(third["message"], "Welcome aboard");
    assert_ne!(third["conversationId"], first["conversationId"]);

    assert_eq!(count(&pool, "conversations").await, 2);
    assert_eq!(count(&pool, "messages").await, 6);

    let conversation_id = first["conversationId"].as_str().unwrap();
    let (status, conversation) = send(
        &app,
        Method::GET,
        &format!("/api/v1/conversations/{conversation_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = conversation["messages"].as_array().unwrap();
    let transcript: Vec<(&str, &str)> = messages
        .iter()
        .map(|m| (m["role"].as_str().unwrap(), m["content"].as_str().unwrap()))
        .collect();
    assert_eq!(
        transcript,
        vec![
            ("USER", "what's your cost?"),
            ("ASSISTANT", "See /pricing"),
            ("USER", "what is your refund policy"),
            ("ASSISTANT", "30-day refund policy"),
        ]
    );

    let (_, overview) = send(
        &app,
        Method::GET,
        "/api/v1/analytics/overview",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(overview, json!({ "conversations": 2, "messages": 6, "leads": 0 }));

    let (_, metrics) = send(
        &app,
        Method::GET,
        "/api/v1/analytics/metrics",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(metrics[0]["metric"], "messages");
    assert_eq!(metrics[0]["value"], 3);

    let (_, unread) = send(
        &app,
        Method::GET,
        "/api/v1/notifications/unread",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(unread["count"], 1);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_disabled_intent_is_ignored() {
    let _pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;
    let bot_id = create_bot(&app, &token, "Hello!").await;

    let (_, intent) = send(
        &app,
        Method::POST,
        &format!("/api/v1/bots/{bot_id}/intents"),
        Some(&token),
        Some(json!({ "name": "help", "patterns": ["help"], "response": "How can I help?" })),
    )
    .await;
    let intent_id = intent["id"].as_str().unwrap();

    send(
        &app,
        Method::POST,
        &format!("/api/v1/bots/{bot_id}/publish"),
        Some(&token),
        None,
    )
    .await;

    let (_, reply) = chat(&app, &bot_id, "s1", "I need HELP").await;
    assert_eq!(reply["message"], "How can I help?");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/bots/{bot_id}/intents/{intent_id}"),
        Some(&token),
        Some(json!({ "enabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, reply) = chat(&app, &bot_id, "s1", "I need HELP").await;
    assert_eq!(reply["message"], "Hello!");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_bots_are_scoped_to_their_owner() {
    let _pool = setup_test_db().await;
    let app = create_test_app();
    let (owner, _) = register(&app, "owner@example.com").await;
    let (intruder, _) = register(&app, "intruder@example.com").await;
    let bot_id = create_bot(&app, &owner, "Hello!").await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/v1/bots/{bot_id}"),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/bots/{bot_id}"),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bots) = send(&app, Method::GET, "/api/v1/bots", Some(&intruder), None).await;
    assert_eq!(bots, json!([]));

    let (status, bot) = send(
        &app,
        Method::GET,
        &format!("/api/v1/bots/{bot_id}"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bot["color"], "#6366f1");
    assert_eq!(bot["_count"]["intents"], 0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_plan_creation_requires_admin() {
    let _pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/subscriptions/plans",
        Some(&token),
        Some(json!({
            "name": "Pro",
            "price": 4900,
            "interval": "MONTH",
            "botLimit": 10,
            "messageLimit": 10000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, plans) = send(
        &app,
        Method::GET,
        "/api/v1/subscriptions/plans",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plans, json!([]));

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_document_upload_list_delete() {
    let pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;
    let bot_id = create_bot(&app, &token, "Hello!").await;

    let boundary = "X-BOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"botId\"\r\n\r\n{bot_id}\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"shipping.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nWe ship worldwide.\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/documents")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let document: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(document["name"], "shipping.txt");
    assert_eq!(document["status"], "COMPLETED");

    let (content,): (String,) = sqlx::query_as("SELECT content FROM documents")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(content, "We ship worldwide.");

    let (_, documents) = send(
        &app,
        Method::GET,
        &format!("/api/v1/documents?botId={bot_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(documents.as_array().unwrap().len(), 1);

    let document_id = document["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/documents/{document_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count(&pool, "documents").await, 0);

    cleanup_test_db();
}

fn stored_upload_count() -> usize {
    std::fs::read_dir(AppConfig::from_env().upload_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
#[serial]
async fn test_rejected_upload_leaves_no_file_behind() {
    let pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;
    let bot_id = create_bot(&app, &token, "Hello!").await;
    let stored_before = stored_upload_count();

    let boundary = "X-BOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"botId\"\r\n\r\n{bot_id}\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
         Content-Type: image/png\r\n\r\nnot really a png\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/documents")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count(&pool, "documents").await, 0);
    assert_eq!(stored_upload_count(), stored_before);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_leads_are_captured_for_owned_conversations() {
    let _pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;
    let bot_id = create_bot(&app, &token, "Hello!").await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/bots/{bot_id}/publish"),
        Some(&token),
        None,
    )
    .await;
    let (_, reply) = chat(&app, &bot_id, "visitor-1", "hi").await;
    let conversation_id = reply["conversationId"].as_str().unwrap();

    let (status, lead) = send(
        &app,
        Method::POST,
        "/api/v1/leads",
        Some(&token),
        Some(json!({ "conversationId": conversation_id, "email": "lead@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{lead}");
    assert_eq!(lead["status"], "NEW");

    let lead_id = lead["id"].as_str().unwrap();
    let (status, lead) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/leads/{lead_id}"),
        Some(&token),
        Some(json!({ "status": "QUALIFIED", "score": 80 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["score"], 80);

    let (_, leads) = send(
        &app,
        Method::GET,
        "/api/v1/leads?status=QUALIFIED",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(leads[0]["botName"], "Support");

    let (_, overview) = send(
        &app,
        Method::GET,
        "/api/v1/analytics/overview",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(overview["leads"], 1);

    let (other, _) = register(&app, "other@example.com").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/leads",
        Some(&other),
        Some(json!({ "conversationId": conversation_id, "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_malformed_path_ids_get_json_errors() {
    let _pool = setup_test_db().await;
    let app = create_test_app();
    let (token, _) = register(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/chat/not-a-uuid/config",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Bot not found or not published");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/bots/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/v1/bots/not-a-uuid/faqs/also-not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    cleanup_test_db();
}
