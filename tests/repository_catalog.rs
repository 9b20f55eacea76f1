mod common;

use local_library::domain::entities::{AuthorInput, BookInput};
use local_library::domain::repositories::{
    AuthorRepository, BookRepository, GenreRepository, LanguageRepository,
};
use local_library::error::AppError;
use local_library::infrastructure::persistence::{
    PgAuthorRepository, PgBookRepository, PgGenreRepository, PgLanguageRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

fn book_input(title: &str, author_id: Option<i64>, genre_ids: Vec<i64>) -> BookInput {
    BookInput {
        title: title.to_string(),
        author_id,
        summary: "A summary.".to_string(),
        isbn: "9780441013593".to_string(),
        genre_ids,
        language_id: None,
    }
}

#[sqlx::test]
async fn test_create_book_with_genres(pool: PgPool) {
    let author = common::create_test_author(&pool, "Frank", "Herbert").await;
    let sf = common::genre_id(&pool, "Science Fiction").await;
    let fantasy = common::genre_id(&pool, "Fantasy").await;
    let repo = PgBookRepository::new(Arc::new(pool));

    let book = repo
        .create(book_input("Dune", Some(author), vec![sf, fantasy]))
        .await
        .unwrap();

    assert_eq!(book.title, "Dune");
    assert_eq!(book.author_name.as_deref(), Some("Herbert, Frank"));
    assert_eq!(book.genre_display(), "Fantasy, Science Fiction");
}

#[sqlx::test]
async fn test_update_book_replaces_genres(pool: PgPool) {
    let sf = common::genre_id(&pool, "Science Fiction").await;
    let western = common::genre_id(&pool, "Western").await;
    let english = common::language_id(&pool, "English").await;
    let repo = PgBookRepository::new(Arc::new(pool));

    let book = repo.create(book_input("Dune", None, vec![sf])).await.unwrap();

    let mut input = book_input("Dune Messiah", None, vec![western]);
    input.language_id = Some(english);
    let updated = repo.update(book.id, input).await.unwrap();

    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.genres.len(), 1);
    assert_eq!(updated.genres[0].name, "Western");
    assert_eq!(updated.language_name.as_deref(), Some("English"));
}

#[sqlx::test]
async fn test_update_book_not_found(pool: PgPool) {
    let sf = common::genre_id(&pool, "Science Fiction").await;
    let repo = PgBookRepository::new(Arc::new(pool));

    let result = repo.update(424242, book_input("Ghost", None, vec![sf])).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_list_books_orders_by_title(pool: PgPool) {
    for title in ["Ubik", "Dune", "Emma"] {
        common::create_test_book(&pool, title, None).await;
    }
    let repo = PgBookRepository::new(Arc::new(pool));

    let first_page = repo.list(0, 2).await.unwrap();
    let second_page = repo.list(2, 2).await.unwrap();

    let titles: Vec<_> = first_page.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Dune", "Emma"]);
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].title, "Ubik");
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[sqlx::test]
async fn test_find_book_not_found(pool: PgPool) {
    let repo = PgBookRepository::new(Arc::new(pool));

    assert!(repo.find_by_id(99999).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_delete_book(pool: PgPool) {
    let book = common::create_test_book(&pool, "Doomed", None).await;
    let repo = PgBookRepository::new(Arc::new(pool));

    assert!(repo.delete(book).await.unwrap());
    assert!(!repo.delete(book).await.unwrap());
}

#[sqlx::test]
async fn test_author_crud(pool: PgPool) {
    let repo = PgAuthorRepository::new(Arc::new(pool.clone()));

    let author = repo
        .create(AuthorInput {
            first_name: "Isaac".into(),
            last_name: "Asimov".into(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1920, 1, 2),
            date_of_death: None,
        })
        .await
        .unwrap();
    assert_eq!(author.display_name(), "Asimov, Isaac");

    let updated = repo
        .update(
            author.id,
            AuthorInput {
                first_name: "Isaac".into(),
                last_name: "Asimov".into(),
                date_of_birth: author.date_of_birth,
                date_of_death: chrono::NaiveDate::from_ymd_opt(1992, 4, 6),
            },
        )
        .await
        .unwrap();
    assert!(updated.date_of_death.is_some());

    let book = common::create_test_book(&pool, "Foundation", Some(author.id)).await;
    let books = repo.books_by_author(author.id).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, book);

    assert!(repo.delete(author.id).await.unwrap());
    assert!(repo.find_by_id(author.id).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_update_author_not_found(pool: PgPool) {
    let repo = PgAuthorRepository::new(Arc::new(pool));

    let result = repo
        .update(
            31337,
            AuthorInput {
                first_name: "No".into(),
                last_name: "One".into(),
                date_of_birth: None,
                date_of_death: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_genres_seeded_and_unique(pool: PgPool) {
    let repo = PgGenreRepository::new(Arc::new(pool));

    let genres = repo.list().await.unwrap();
    assert_eq!(genres.len(), 5);
    assert_eq!(repo.count().await.unwrap(), 5);

    let created = repo.create("Horror").await.unwrap();
    assert_eq!(created.name, "Horror");
    assert_eq!(
        repo.find_by_name("Horror").await.unwrap().map(|g| g.id),
        Some(created.id)
    );

    let duplicate = repo.create("Fantasy").await;
    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_languages(pool: PgPool) {
    let repo = PgLanguageRepository::new(Arc::new(pool));

    let created = repo.create("Spanish").await.unwrap();
    let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|l| l.name).collect();

    assert!(names.contains(&created.name));
    assert!(repo.find_by_name("Klingon").await.unwrap().is_none());
}
