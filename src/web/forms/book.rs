//! Book create/update form.

use serde::Deserialize;
use validator::Validate;

use super::errors::FormErrors;
use crate::domain::entities::{Author, Book, BookInput, Genre, Language};

const INVALID_CHOICE: &str = "Select a valid choice.";

/// Raw book form fields. `genre` repeats once per selected option.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters."))]
    pub title: String,
    pub author: String,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters."))]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters."))]
    pub isbn: String,
    pub genre: Vec<String>,
    pub language: String,
    pub csrf_token: String,
}

/// Parses an optional select value; blank means "none chosen".
fn parse_choice(raw: &str) -> Result<Option<i64>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| ())
}

impl BookForm {
    /// Form pre-filled with an existing book.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id.map(|id| id.to_string()).unwrap_or_default(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genres.iter().map(|g| g.id.to_string()).collect(),
            language: book
                .language_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            csrf_token: String::new(),
        }
    }

    pub fn is_author_selected(&self, author: &Author) -> bool {
        self.author.trim() == author.id.to_string()
    }

    pub fn is_genre_selected(&self, genre: &Genre) -> bool {
        let id = genre.id.to_string();
        self.genre.iter().any(|g| g.trim() == id)
    }

    pub fn is_language_selected(&self, language: &Language) -> bool {
        self.language.trim() == language.id.to_string()
    }

    /// Checks the fields and converts them to service input.
    ///
    /// Whether the chosen author, genres and language exist is left to the
    /// catalog service.
    pub fn to_input(&self) -> Result<BookInput, FormErrors> {
        let trimmed = Self {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            ..self.clone()
        };

        let mut errors = trimmed
            .validate()
            .map_or_else(FormErrors::from, |_| FormErrors::new());

        let author_id = parse_choice(&self.author).unwrap_or_else(|_| {
            errors.add("author", INVALID_CHOICE);
            None
        });
        let language_id = parse_choice(&self.language).unwrap_or_else(|_| {
            errors.add("language", INVALID_CHOICE);
            None
        });

        let mut genre_ids = Vec::with_capacity(self.genre.len());
        for raw in &self.genre {
            match parse_choice(raw) {
                Ok(Some(id)) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(()) => errors.add("genre", INVALID_CHOICE),
            }
        }
        if genre_ids.is_empty() && !errors.has("genre") {
            errors.add("genre", "This field is required.");
        }

        errors.into_result(BookInput {
            title: trimmed.title,
            author_id,
            summary: trimmed.summary,
            isbn: trimmed.isbn,
            genre_ids,
            language_id,
        })
    }
}
