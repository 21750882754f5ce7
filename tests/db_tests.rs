//! Database and schema tests
//!
//! Tests SQLite migrations, entity storage, and schema constraints

use chatbot_studio_api::infrastructure::entities::{MessageRole, UserRole};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

/// Setup test database with migrations
///
/// A single connection keeps every query on the same in-memory database.
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

async fn insert_user(pool: &SqlitePool, email: &str) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at) VALUES (?, ?, 'x', 'Test', ?, ?, ?)",
    )
    .bind(id)
    .bind(email)
    .bind(UserRole::User)
    .bind(Utc::now())
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

async fn insert_bot(pool: &SqlitePool, user_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO bots (id, user_id, name, system_prompt, welcome_message, color, published, created_at, updated_at) VALUES (?, ?, 'Bot', 'p', 'Hi', '#6366f1', TRUE, ?, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(Utc::now())
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn insert_conversation(
    pool: &SqlitePool,
    bot_id: Uuid,
    session_id: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO conversations (id, bot_id, session_id, source, created_at) VALUES (?, ?, ?, 'widget', ?)",
    )
    .bind(id)
    .bind(bot_id)
    .bind(session_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

#[tokio::test]
async fn test_database_migrations_work() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
    let tables: Vec<String> = tables.into_iter().map(|(name,)| name).collect();

    for expected in [
        "analytics",
        "bots",
        "conversations",
        "faqs",
        "intents",
        "leads",
        "messages",
        "notifications",
        "plans",
        "subscriptions",
        "users",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
    }
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let pool = setup_test_db().await;

    insert_user(&pool, "a@example.com").await.unwrap();
    let err = insert_user(&pool, "a@example.com").await.unwrap_err();

    match err {
        sqlx::Error::Database(db) => assert!(db.is_unique_violation()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_one_conversation_per_session() {
    let pool = setup_test_db().await;
    let user = insert_user(&pool, "a@example.com").await.unwrap();
    let bot = insert_bot(&pool, user).await;

    insert_conversation(&pool, bot, "s1").await.unwrap();
    assert!(insert_conversation(&pool, bot, "s1").await.is_err());
    insert_conversation(&pool, bot, "s2").await.unwrap();
}

#[tokio::test]
async fn test_message_role_enum_storage() {
    let pool = setup_test_db().await;
    let user = insert_user(&pool, "a@example.com").await.unwrap();
    let bot = insert_bot(&pool, user).await;
    let conversation = insert_conversation(&pool, bot, "s1").await.unwrap();

    for (role, content) in [(MessageRole::User, "hi"), (MessageRole::Assistant, "hello")] {
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, role, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(conversation)
        .bind(role)
        .bind(content)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
    }

    let roles: Vec<(String,)> = sqlx::query_as("SELECT role FROM messages ORDER BY rowid")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(roles, vec![("USER".to_owned(),), ("ASSISTANT".to_owned(),)]);
}

#[tokio::test]
async fn test_bot_delete_cascades() {
    let pool = setup_test_db().await;
    let user = insert_user(&pool, "a@example.com").await.unwrap();
    let bot = insert_bot(&pool, user).await;
    let conversation = insert_conversation(&pool, bot, "s1").await.unwrap();

    sqlx::query(
        "INSERT INTO messages (id, conversation_id, role, content, created_at) VALUES (?, ?, 'USER', 'hi', ?)",
    )
    .bind(Uuid::new_v4())
    .bind(conversation)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM bots WHERE id = ?")
        .bind(bot)
        .execute(&pool)
        .await
        .unwrap();

    let (conversations,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (messages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(conversations, 0);
    assert_eq!(messages, 0);
}

#[tokio::test]
async fn test_analytics_upsert_accumulates() {
    let pool = setup_test_db().await;
    let user = insert_user(&pool, "a@example.com").await.unwrap();
    let bot = insert_bot(&pool, user).await;
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    for _ in 0..3 {
        sqlx::query(
            "INSERT INTO analytics (id, bot_id, date, metric, value) VALUES (?, ?, ?, 'messages', 1) \
             ON CONFLICT (bot_id, date, metric) DO UPDATE SET value = value + 1",
        )
        .bind(Uuid::new_v4())
        .bind(bot)
        .bind(today)
        .execute(&pool)
        .await
        .unwrap();
    }

    let rows: Vec<(i64,)> = sqlx::query_as("SELECT value FROM analytics")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows, vec![(3,)]);
}
