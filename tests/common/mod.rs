#![allow(dead_code)]

use axum_test::TestServer;
use chrono::NaiveDate;
use local_library::domain::entities::Permission;
use local_library::routes::site_router;
use local_library::state::{AppState, SessionSettings};
use sqlx::PgPool;
use std::sync::Arc;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_state(pool: PgPool) -> AppState {
    let settings = SessionSettings {
        secret: "test-session-secret".to_string(),
        ttl_seconds: 3600,
        secure_cookies: false,
    };
    AppState::new(Arc::new(pool), &settings).unwrap()
}

/// Site routes without rate limiting or path normalization, so requests
/// must not end in `/`. `handler_routing.rs` drives the full router.
pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(site_router(state, "static")).unwrap()
}

pub async fn create_test_author(pool: &PgPool, first: &str, last: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO authors (first_name, last_name) VALUES ($1, $2) RETURNING id")
        .bind(first)
        .bind(last)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_book(pool: &PgPool, title: &str, author_id: Option<i64>) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO books (title, author_id, summary, isbn) VALUES ($1, $2, 'A summary.', '9780000000000') RETURNING id",
    )
    .bind(title)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn genre_id(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM genres WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn language_id(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM languages WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_copy(pool: &PgPool, book_id: i64, status: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO book_instances (book_id, imprint, status) VALUES ($1, 'Test Press, 2020', $2) RETURNING id",
    )
    .bind(book_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_loan(pool: &PgPool, book_id: i64, borrower_id: i64, due_back: NaiveDate) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO book_instances (book_id, imprint, status, borrower_id, due_back) VALUES ($1, 'Test Press, 2020', 'o', $2, $3) RETURNING id",
    )
    .bind(book_id)
    .bind(borrower_id)
    .bind(due_back)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_user(state: &AppState, username: &str, permissions: &[Permission]) -> i64 {
    let user = state
        .auth_service
        .create_user(username, TEST_PASSWORD)
        .await
        .unwrap();
    for permission in permissions {
        state.auth_service.grant(username, *permission).await.unwrap();
    }
    user.id
}

/// Browser-side view of a session: the `Cookie` header value and the CSRF
/// token its forms carry.
pub struct TestSession {
    pub cookie: String,
    pub csrf_token: String,
    pub user_id: Option<i64>,
}

pub async fn anonymous_session(state: &AppState) -> TestSession {
    let started = state.session_service.start().await.unwrap();
    TestSession {
        cookie: format!("sessionid={}", started.raw_id),
        csrf_token: started.session.csrf_token,
        user_id: None,
    }
}

/// Creates a user with the given permissions and signs them in.
pub async fn login_as(state: &AppState, username: &str, permissions: &[Permission]) -> TestSession {
    let user_id = create_test_user(state, username, permissions).await;
    let started = state.session_service.login(None, 0, user_id).await.unwrap();
    TestSession {
        cookie: format!("sessionid={}", started.raw_id),
        csrf_token: started.session.csrf_token,
        user_id: Some(user_id),
    }
}

pub async fn librarian(state: &AppState) -> TestSession {
    login_as(state, "librarian", &Permission::ALL).await
}

pub async fn session_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// `name=value` part of a `Set-Cookie` header, ready to send back.
pub fn cookie_pair(response: &axum_test::TestResponse) -> String {
    let set_cookie = response.header("set-cookie");
    set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Value of the hidden `csrf_token` field in a rendered form.
pub fn csrf_token_in(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).unwrap() + marker.len();
    let end = html[start..].find('"').unwrap();
    html[start..start + end].to_string()
}
