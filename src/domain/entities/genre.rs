//! Genre and language reference entities.

/// A book genre (e.g. "Science Fiction").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// The natural language a book is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: i64,
    pub name: String,
}
