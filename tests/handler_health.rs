mod common;

use axum_test::TestServer;
use local_library::routes::site_router;
use sqlx::PgPool;

#[sqlx::test]
async fn test_health_endpoint_success(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let book_id = common::create_test_book(&pool, "Dune", None).await;
    common::create_test_copy(&pool, book_id, "a").await;

    let server = TestServer::new(site_router(state, "static")).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(
        json["checks"]["database"]["message"],
        "Connected, 1 books, 1 copies"
    );
}

#[sqlx::test]
async fn test_health_endpoint_structure(pool: PgPool) {
    let server = common::create_test_server(common::create_test_state(pool));

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("database").is_some());
}

#[sqlx::test]
async fn test_health_sets_no_session_cookie(pool: PgPool) {
    let server = common::create_test_server(common::create_test_state(pool));

    let response = server.get("/health").await;

    assert!(response.maybe_header("set-cookie").is_none());
}
