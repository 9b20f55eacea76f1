mod common;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use local_library::domain::entities::Permission;
use sqlx::PgPool;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn due_back(pool: &PgPool, copy_id: i64) -> Option<NaiveDate> {
    sqlx::query_scalar("SELECT due_back FROM book_instances WHERE id = $1")
        .bind(copy_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_my_loans_requires_login(pool: PgPool) {
    let server = common::create_test_server(common::create_test_state(pool));

    let response = server.get("/catalog/mybooks").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        response.header("location"),
        "/accounts/login/?next=%2Fcatalog%2Fmybooks"
    );
}

#[sqlx::test]
async fn test_my_loans_lists_only_own_loans(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let reader = common::login_as(&state, "reader", &[]).await;
    let other = common::create_test_user(&state, "other", &[]).await;
    let reader_id = reader.user_id.unwrap();

    let dune = common::create_test_book(&pool, "Dune", None).await;
    let emma = common::create_test_book(&pool, "Emma", None).await;
    let ubik = common::create_test_book(&pool, "Ubik", None).await;
    common::create_loan(&pool, emma, reader_id, today() + Duration::days(10)).await;
    common::create_loan(&pool, dune, reader_id, today() + Duration::days(2)).await;
    common::create_loan(&pool, ubik, other, today() + Duration::days(1)).await;

    let server = common::create_test_server(state);
    let response = server
        .get("/catalog/mybooks")
        .add_header("Cookie", reader.cookie.as_str())
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(!html.contains("Ubik"));
    let dune_at = html.find("Dune").unwrap();
    let emma_at = html.find("Emma").unwrap();
    assert!(dune_at < emma_at, "soonest due first");
}

#[sqlx::test]
async fn test_my_loans_marks_overdue(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let reader = common::login_as(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Late Book", None).await;
    common::create_loan(
        &pool,
        book,
        reader.user_id.unwrap(),
        today() - Duration::days(1),
    )
    .await;

    let server = common::create_test_server(state);
    let html = server
        .get("/catalog/mybooks")
        .add_header("Cookie", reader.cookie.as_str())
        .await
        .text();

    assert!(html.contains(r#"<li class="text-danger">"#));
}

#[sqlx::test]
async fn test_my_loans_empty(pool: PgPool) {
    let state = common::create_test_state(pool);
    let reader = common::login_as(&state, "reader", &[]).await;
    let server = common::create_test_server(state);

    let html = server
        .get("/catalog/mybooks")
        .add_header("Cookie", reader.cookie.as_str())
        .await
        .text();

    assert!(html.contains("There are no books borrowed."));
}

#[sqlx::test]
async fn test_all_loans_requires_permission(pool: PgPool) {
    let state = common::create_test_state(pool);
    let reader = common::login_as(&state, "reader", &[]).await;
    let server = common::create_test_server(state);

    server
        .get("/catalog/borrowed")
        .add_header("Cookie", reader.cookie.as_str())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let anonymous = server.get("/catalog/borrowed").await;
    anonymous.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        anonymous.header("location"),
        "/accounts/login/?next=%2Fcatalog%2Fborrowed"
    );
}

#[sqlx::test]
async fn test_all_loans_shows_borrowers_and_paginates(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;

    let book = common::create_test_book(&pool, "Popular Book", None).await;
    for days in 1..=5 {
        common::create_loan(&pool, book, reader, today() + Duration::days(days)).await;
    }

    let server = common::create_test_server(state);

    let first = server
        .get("/catalog/borrowed")
        .add_header("Cookie", librarian.cookie.as_str())
        .await;
    first.assert_status_ok();
    let html = first.text();
    assert_eq!(html.matches("Popular Book").count(), 4);
    assert!(html.contains("- reader"));
    assert!(html.contains("Page 1 of 2."));

    let last = server
        .get("/catalog/borrowed")
        .add_query_param("page", "last")
        .add_header("Cookie", librarian.cookie.as_str())
        .await;
    last.assert_status_ok();
    assert_eq!(last.text().matches("Popular Book").count(), 1);
}

#[sqlx::test]
async fn test_renew_form_proposes_three_weeks(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let copy = common::create_loan(&pool, book, reader, today() + Duration::days(1)).await;

    let server = common::create_test_server(state);
    let response = server
        .get(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .await;

    response.assert_status_ok();
    let proposed = (today() + Duration::weeks(3)).format("%Y-%m-%d").to_string();
    assert!(response.text().contains(&format!(r#"value="{proposed}""#)));
}

#[sqlx::test]
async fn test_renew_success_redirects_to_all_loans(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let copy = common::create_loan(&pool, book, reader, today() + Duration::days(1)).await;

    let new_date = today() + Duration::weeks(2);
    let server = common::create_test_server(state);
    let response = server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .form(&[
            ("renewal_date", new_date.format("%Y-%m-%d").to_string()),
            ("csrf_token", librarian.csrf_token.clone()),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/catalog/borrowed/");
    assert_eq!(due_back(&pool, copy).await, Some(new_date));
}

#[sqlx::test]
async fn test_renew_rejects_past_date(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let original = today() + Duration::days(1);
    let copy = common::create_loan(&pool, book, reader, original).await;

    let server = common::create_test_server(state);
    let response = server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .form(&[
            (
                "renewal_date",
                (today() - Duration::days(1)).format("%Y-%m-%d").to_string(),
            ),
            ("csrf_token", librarian.csrf_token.clone()),
        ])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("Invalid date - renewal in past"));
    assert_eq!(due_back(&pool, copy).await, Some(original));
}

#[sqlx::test]
async fn test_renew_rejects_more_than_four_weeks(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let copy = common::create_loan(&pool, book, reader, today() + Duration::days(1)).await;

    let server = common::create_test_server(state);
    let response = server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .form(&[
            (
                "renewal_date",
                (today() + Duration::weeks(4) + Duration::days(1))
                    .format("%Y-%m-%d")
                    .to_string(),
            ),
            ("csrf_token", librarian.csrf_token.clone()),
        ])
        .await;

    response.assert_status_ok();
    assert!(
        response
            .text()
            .contains("Invalid date - renewal more than 4 weeks ahead")
    );
}

#[sqlx::test]
async fn test_renew_accepts_four_weeks_exactly(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let copy = common::create_loan(&pool, book, reader, today() + Duration::days(1)).await;

    let limit = today() + Duration::weeks(4);
    let server = common::create_test_server(state);
    server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .form(&[
            ("renewal_date", limit.format("%Y-%m-%d").to_string()),
            ("csrf_token", librarian.csrf_token.clone()),
        ])
        .await
        .assert_status(StatusCode::SEE_OTHER);

    assert_eq!(due_back(&pool, copy).await, Some(limit));
}

#[sqlx::test]
async fn test_renew_blank_date(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let copy = common::create_test_copy(&pool, book, "a").await;

    let server = common::create_test_server(state);
    let response = server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .form(&[
            ("renewal_date", String::new()),
            ("csrf_token", librarian.csrf_token.clone()),
        ])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("This field is required."));
}

#[sqlx::test]
async fn test_renew_unknown_copy(pool: PgPool) {
    let state = common::create_test_state(pool);
    let librarian = common::librarian(&state).await;
    let server = common::create_test_server(state);

    server
        .get("/catalog/book/31337/renew")
        .add_header("Cookie", librarian.cookie.as_str())
        .await
        .assert_status_not_found();
}

#[sqlx::test]
async fn test_renew_requires_permission(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let clerk = common::login_as(&state, "clerk", &[Permission::AddBook]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let copy = common::create_loan(
        &pool,
        book,
        clerk.user_id.unwrap(),
        today() + Duration::days(1),
    )
    .await;

    let server = common::create_test_server(state);
    server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", clerk.cookie.as_str())
        .form(&[
            (
                "renewal_date",
                (today() + Duration::weeks(1)).format("%Y-%m-%d").to_string(),
            ),
            ("csrf_token", clerk.csrf_token.clone()),
        ])
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_renew_csrf_mismatch(pool: PgPool) {
    let state = common::create_test_state(pool.clone());
    let librarian = common::librarian(&state).await;
    let reader = common::create_test_user(&state, "reader", &[]).await;
    let book = common::create_test_book(&pool, "Dune", None).await;
    let original = today() + Duration::days(1);
    let copy = common::create_loan(&pool, book, reader, original).await;

    let server = common::create_test_server(state);
    server
        .post(&format!("/catalog/book/{copy}/renew"))
        .add_header("Cookie", librarian.cookie.as_str())
        .form(&[
            (
                "renewal_date",
                (today() + Duration::weeks(1)).format("%Y-%m-%d").to_string(),
            ),
            ("csrf_token", "forged".to_string()),
        ])
        .await
        .assert_status(StatusCode::FORBIDDEN);

    assert_eq!(due_back(&pool, copy).await, Some(original));
}
