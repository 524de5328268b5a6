//! The catalog's route table.

use std::fmt;

use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    BookList,
    NewBook,
    EditBook(EntityId),
    NewGenre,
}

impl Route {
    /// Resolve a location path. `/` redirects to the book list; unknown paths
    /// resolve to `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] | ["books"] => Some(Route::BookList),
            ["books", "new"] => Some(Route::NewBook),
            ["books", "edit", id] => Some(Route::EditBook(EntityId::from(*id))),
            ["genres", "new"] => Some(Route::NewGenre),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::BookList => f.write_str("/books"),
            Route::NewBook => f.write_str("/books/new"),
            Route::EditBook(id) => write!(f, "/books/edit/{id}"),
            Route::NewGenre => f.write_str("/genres/new"),
        }
    }
}
