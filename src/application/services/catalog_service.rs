//! Catalog browsing and management: books, authors and the index summary.

use std::sync::Arc;

use crate::application::pagination::{Page, PageRequest, PageWindow};
use crate::domain::entities::{
    Author, AuthorInput, Book, BookInput, BookInstance, Genre, Language, LoanStatus,
};
use crate::domain::repositories::{
    AuthorRepository, BookInstanceRepository, BookRepository, GenreRepository,
    LanguageRepository,
};
use crate::error::AppError;
use serde_json::json;

/// Books shown per page in the book list.
pub const BOOKS_PER_PAGE: u32 = 4;

/// Record counts shown on the home page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
}

/// A book together with all of its copies.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: Book,
    pub copies: Vec<BookInstance>,
}

/// An author together with the books they wrote.
#[derive(Debug, Clone)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Options offered by the book form's select boxes.
#[derive(Debug, Clone, Default)]
pub struct BookFormChoices {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub languages: Vec<Language>,
}

/// Service for browsing and editing the catalog.
///
/// Validates cross-record rules (referenced authors, genres and languages
/// must exist; an author cannot die before being born) before touching the
/// repositories.
pub struct CatalogService<B, A, I, G, L>
where
    B: BookRepository,
    A: AuthorRepository,
    I: BookInstanceRepository,
    G: GenreRepository,
    L: LanguageRepository,
{
    books: Arc<B>,
    authors: Arc<A>,
    copies: Arc<I>,
    genres: Arc<G>,
    languages: Arc<L>,
}

impl<B, A, I, G, L> CatalogService<B, A, I, G, L>
where
    B: BookRepository,
    A: AuthorRepository,
    I: BookInstanceRepository,
    G: GenreRepository,
    L: LanguageRepository,
{
    /// Creates a new catalog service.
    pub fn new(
        books: Arc<B>,
        authors: Arc<A>,
        copies: Arc<I>,
        genres: Arc<G>,
        languages: Arc<L>,
    ) -> Self {
        Self {
            books,
            authors,
            copies,
            genres,
            languages,
        }
    }

    /// Counts books, copies, available copies, authors and genres.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn summary(&self) -> Result<CatalogSummary, AppError> {
        Ok(CatalogSummary {
            num_books: self.books.count().await?,
            num_instances: self.copies.count().await?,
            num_instances_available: self.copies.count_by_status(LoanStatus::Available).await?,
            num_authors: self.authors.count().await?,
            num_genres: self.genres.count().await?,
        })
    }

    /// Lists one page of books ordered by title.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the page does not exist.
    pub async fn list_books(&self, request: PageRequest) -> Result<Page<Book>, AppError> {
        let count = self.books.count().await?;
        let window = PageWindow::resolve(request, count, BOOKS_PER_PAGE)?;
        let items = self.books.list(window.offset, window.limit).await?;

        Ok(Page::new(items, window, count))
    }

    /// Retrieves a book by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no book has this id.
    pub async fn get_book(&self, id: i64) -> Result<Book, AppError> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found", json!({ "id": id })))
    }

    /// Retrieves a book with its copies.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no book has this id.
    pub async fn book_detail(&self, id: i64) -> Result<BookDetail, AppError> {
        let book = self.get_book(id).await?;
        let copies = self.copies.list_for_book(id).await?;

        Ok(BookDetail { book, copies })
    }

    /// Creates a book after checking its references.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] (attached to the offending field) if
    /// the author, language or a genre does not exist.
    pub async fn create_book(&self, input: BookInput) -> Result<Book, AppError> {
        self.check_book_references(&input).await?;

        let book = self.books.create(input).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");

        Ok(book)
    }

    /// Replaces a book's fields and genres.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no book has this id.
    /// Returns [`AppError::Validation`] for dangling references.
    pub async fn update_book(&self, id: i64, input: BookInput) -> Result<Book, AppError> {
        self.get_book(id).await?;
        self.check_book_references(&input).await?;

        let book = self.books.update(id, input).await?;
        tracing::info!(book_id = book.id, "Book updated");

        Ok(book)
    }

    /// Deletes a book that has no copies left.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no book has this id.
    /// Returns [`AppError::Conflict`] while copies of the book exist.
    pub async fn delete_book(&self, id: i64) -> Result<(), AppError> {
        let copies = self.copies.list_for_book(id).await?;
        if !copies.is_empty() {
            return Err(AppError::conflict(
                "This book cannot be deleted while copies of it exist. Delete the copies first.",
                json!({ "id": id, "copies": copies.len() }),
            ));
        }

        if !self.books.delete(id).await? {
            return Err(AppError::not_found("Book not found", json!({ "id": id })));
        }

        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    /// Lists every author ordered by name.
    pub async fn list_authors(&self) -> Result<Vec<Author>, AppError> {
        self.authors.list().await
    }

    /// Retrieves an author by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no author has this id.
    pub async fn get_author(&self, id: i64) -> Result<Author, AppError> {
        self.authors
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Author not found", json!({ "id": id })))
    }

    /// Retrieves an author with their books.
    pub async fn author_detail(&self, id: i64) -> Result<AuthorDetail, AppError> {
        let author = self.get_author(id).await?;
        let books = self.authors.books_by_author(id).await?;

        Ok(AuthorDetail { author, books })
    }

    /// Creates an author.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the death date precedes the birth date.
    pub async fn create_author(&self, input: AuthorInput) -> Result<Author, AppError> {
        validate_lifespan(&input)?;

        let author = self.authors.create(input).await?;
        tracing::info!(author_id = author.id, "Author created");

        Ok(author)
    }

    /// Replaces an author's fields.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the death date precedes the birth date.
    /// Returns [`AppError::NotFound`] if no author has this id.
    pub async fn update_author(&self, id: i64, input: AuthorInput) -> Result<Author, AppError> {
        validate_lifespan(&input)?;

        let author = self.authors.update(id, input).await?;
        tracing::info!(author_id = author.id, "Author updated");

        Ok(author)
    }

    /// Deletes an author. Their books remain, without an author.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no author has this id.
    pub async fn delete_author(&self, id: i64) -> Result<(), AppError> {
        if !self.authors.delete(id).await? {
            return Err(AppError::not_found("Author not found", json!({ "id": id })));
        }

        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    /// Loads the options for the book form.
    pub async fn form_choices(&self) -> Result<BookFormChoices, AppError> {
        Ok(BookFormChoices {
            authors: self.authors.list().await?,
            genres: self.genres.list().await?,
            languages: self.languages.list().await?,
        })
    }

    /// Lists all genres.
    pub async fn list_genres(&self) -> Result<Vec<Genre>, AppError> {
        self.genres.list().await
    }

    /// Adds a genre.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank name.
    /// Returns [`AppError::Conflict`] if the genre exists.
    pub async fn add_genre(&self, name: &str) -> Result<Genre, AppError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 200 {
            return Err(AppError::field("name", "Genre name must be 1-200 characters."));
        }
        if self.genres.find_by_name(name).await?.is_some() {
            return Err(AppError::conflict("Genre already exists", json!({ "name": name })));
        }

        self.genres.create(name).await
    }

    /// Adds a language.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank name.
    /// Returns [`AppError::Conflict`] if the language exists.
    pub async fn add_language(&self, name: &str) -> Result<Language, AppError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 200 {
            return Err(AppError::field("name", "Language name must be 1-200 characters."));
        }
        if self.languages.find_by_name(name).await?.is_some() {
            return Err(AppError::conflict("Language already exists", json!({ "name": name })));
        }

        self.languages.create(name).await
    }

    async fn check_book_references(&self, input: &BookInput) -> Result<(), AppError> {
        if let Some(author_id) = input.author_id
            && self.authors.find_by_id(author_id).await?.is_none()
        {
            return Err(AppError::field(
                "author",
                "Select a valid choice. That choice is not one of the available choices.",
            ));
        }

        if input.genre_ids.is_empty() {
            return Err(AppError::field("genre", "This field is required."));
        }

        let known = self.genres.list().await?;
        if let Some(missing) = input
            .genre_ids
            .iter()
            .find(|id| !known.iter().any(|g| g.id == **id))
        {
            return Err(AppError::field(
                "genre",
                format!("Select a valid choice. {missing} is not one of the available choices."),
            ));
        }

        if let Some(language_id) = input.language_id {
            let languages = self.languages.list().await?;
            if !languages.iter().any(|l| l.id == language_id) {
                return Err(AppError::field(
                    "language",
                    "Select a valid choice. That choice is not one of the available choices.",
                ));
            }
        }

        Ok(())
    }
}

fn validate_lifespan(input: &AuthorInput) -> Result<(), AppError> {
    if let (Some(born), Some(died)) = (input.date_of_birth, input.date_of_death)
        && died < born
    {
        return Err(AppError::field(
            "date_of_death",
            "Date of death cannot be before date of birth.",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        MockAuthorRepository, MockBookInstanceRepository, MockBookRepository,
        MockGenreRepository, MockLanguageRepository,
    };
    use chrono::NaiveDate;

    type TestService = CatalogService<
        MockBookRepository,
        MockAuthorRepository,
        MockBookInstanceRepository,
        MockGenreRepository,
        MockLanguageRepository,
    >;

    struct Mocks {
        books: MockBookRepository,
        authors: MockAuthorRepository,
        copies: MockBookInstanceRepository,
        genres: MockGenreRepository,
        languages: MockLanguageRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                books: MockBookRepository::new(),
                authors: MockAuthorRepository::new(),
                copies: MockBookInstanceRepository::new(),
                genres: MockGenreRepository::new(),
                languages: MockLanguageRepository::new(),
            }
        }

        fn service(self) -> TestService {
            CatalogService::new(
                Arc::new(self.books),
                Arc::new(self.authors),
                Arc::new(self.copies),
                Arc::new(self.genres),
                Arc::new(self.languages),
            )
        }
    }

    fn test_book(id: i64, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author_id: None,
            author_name: None,
            summary: "Summary".to_string(),
            isbn: "9780441013593".to_string(),
            language_id: None,
            language_name: None,
            genres: vec![],
        }
    }

    fn book_input(genre_ids: Vec<i64>) -> BookInput {
        BookInput {
            title: "Dune".to_string(),
            author_id: None,
            summary: "Spice".to_string(),
            isbn: "9780441013593".to_string(),
            genre_ids,
            language_id: None,
        }
    }

    fn genre(id: i64, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_summary_counts() {
        let mut m = Mocks::new();
        m.books.expect_count().returning(|| Ok(3));
        m.copies.expect_count().returning(|| Ok(10));
        m.copies
            .expect_count_by_status()
            .withf(|s| *s == LoanStatus::Available)
            .returning(|_| Ok(4));
        m.authors.expect_count().returning(|| Ok(2));
        m.genres.expect_count().returning(|| Ok(5));

        let summary = m.service().summary().await.unwrap();

        assert_eq!(
            summary,
            CatalogSummary {
                num_books: 3,
                num_instances: 10,
                num_instances_available: 4,
                num_authors: 2,
                num_genres: 5,
            }
        );
    }

    #[tokio::test]
    async fn test_list_books_paginates_by_four() {
        let mut m = Mocks::new();
        m.books.expect_count().returning(|| Ok(9));
        m.books
            .expect_list()
            .withf(|offset, limit| *offset == 4 && *limit == 4)
            .times(1)
            .returning(|_, _| Ok((5..=8).map(|i| test_book(i, "B")).collect()));

        let page = m.service().list_books(PageRequest::Number(2)).await.unwrap();

        assert_eq!(page.items.len(), 4);
        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 3);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_list_books_invalid_page() {
        let mut m = Mocks::new();
        m.books.expect_count().returning(|| Ok(2));

        let result = m.service().list_books(PageRequest::Number(5)).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_book_not_found() {
        let mut m = Mocks::new();
        m.books.expect_find_by_id().returning(|_| Ok(None));

        let result = m.service().get_book(42).await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_book_success() {
        let mut m = Mocks::new();
        m.genres
            .expect_list()
            .returning(|| Ok(vec![genre(1, "Fantasy"), genre(2, "Science Fiction")]));
        m.books
            .expect_create()
            .withf(|input| input.genre_ids == vec![2])
            .times(1)
            .returning(|_| Ok(test_book(1, "Dune")));

        let book = m.service().create_book(book_input(vec![2])).await.unwrap();

        assert_eq!(book.title, "Dune");
    }

    #[tokio::test]
    async fn test_create_book_requires_genre() {
        let m = Mocks::new();

        let err = m.service().create_book(book_input(vec![])).await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.details()["fields"].get("genre").is_some());
    }

    #[tokio::test]
    async fn test_create_book_unknown_genre() {
        let mut m = Mocks::new();
        m.genres.expect_list().returning(|| Ok(vec![genre(1, "Fantasy")]));
        m.books.expect_create().never();

        let err = m.service().create_book(book_input(vec![99])).await.unwrap_err();

        assert!(err.details()["fields"].get("genre").is_some());
    }

    #[tokio::test]
    async fn test_create_book_unknown_author() {
        let mut m = Mocks::new();
        m.authors.expect_find_by_id().returning(|_| Ok(None));

        let mut input = book_input(vec![1]);
        input.author_id = Some(7);
        let err = m.service().create_book(input).await.unwrap_err();

        assert!(err.details()["fields"].get("author").is_some());
    }

    #[tokio::test]
    async fn test_delete_book_with_copies_is_conflict() {
        let mut m = Mocks::new();
        m.copies.expect_list_for_book().returning(|book_id| {
            Ok(vec![BookInstance {
                id: 1,
                book_id,
                book_title: "Dune".into(),
                imprint: "Ace".into(),
                due_back: None,
                status: LoanStatus::Available,
                borrower_id: None,
                borrower_username: None,
            }])
        });
        m.books.expect_delete().never();

        let err = m.service().delete_book(1).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_book_missing() {
        let mut m = Mocks::new();
        m.copies.expect_list_for_book().returning(|_| Ok(vec![]));
        m.books.expect_delete().returning(|_| Ok(false));

        let err = m.service().delete_book(1).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_author_rejects_death_before_birth() {
        let mut m = Mocks::new();
        m.authors.expect_create().never();

        let input = AuthorInput {
            first_name: "Isaac".into(),
            last_name: "Asimov".into(),
            date_of_birth: Some(date(1992, 4, 6)),
            date_of_death: Some(date(1920, 1, 2)),
        };
        let err = m.service().create_author(input).await.unwrap_err();

        assert!(err.details()["fields"].get("date_of_death").is_some());
    }

    #[tokio::test]
    async fn test_create_author_success() {
        let mut m = Mocks::new();
        m.authors.expect_create().times(1).returning(|input| {
            Ok(Author::new(
                1,
                input.first_name,
                input.last_name,
                input.date_of_birth,
                input.date_of_death,
            ))
        });

        let input = AuthorInput {
            first_name: "Isaac".into(),
            last_name: "Asimov".into(),
            date_of_birth: Some(date(1920, 1, 2)),
            date_of_death: None,
        };
        let author = m.service().create_author(input).await.unwrap();

        assert_eq!(author.display_name(), "Asimov, Isaac");
    }

    #[tokio::test]
    async fn test_delete_author_not_found() {
        let mut m = Mocks::new();
        m.authors.expect_delete().returning(|_| Ok(false));

        let err = m.service().delete_author(3).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_genre_duplicate() {
        let mut m = Mocks::new();
        m.genres
            .expect_find_by_name()
            .withf(|name| name == "Fantasy")
            .returning(|_| Ok(Some(genre(1, "Fantasy"))));
        m.genres.expect_create().never();

        let err = m.service().add_genre("  Fantasy ").await.unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }
}
