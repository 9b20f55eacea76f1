//! Book entity: a title in the catalog, independent of physical copies.

use super::Genre;

/// Number of genres shown in list views.
const GENRE_DISPLAY_LIMIT: usize = 3;

/// A catalog book with its author, language and genres resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: Option<i64>,
    pub author_name: Option<String>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i64>,
    pub language_name: Option<String>,
    pub genres: Vec<Genre>,
}

impl Book {
    /// Comma-separated names of the first few genres.
    pub fn genre_display(&self) -> String {
        self.genres
            .iter()
            .take(GENRE_DISPLAY_LIMIT)
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_genre(&self, genre_id: i64) -> bool {
        self.genres.iter().any(|g| g.id == genre_id)
    }

    pub fn author_display(&self) -> &str {
        self.author_name.as_deref().unwrap_or("")
    }

    pub fn language_display(&self) -> &str {
        self.language_name.as_deref().unwrap_or("")
    }
}

/// Validated input for creating or updating a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author_id: Option<i64>,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i64>,
    pub language_id: Option<i64>,
}
