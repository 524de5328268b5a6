//! Domain types for the catalog API.
//!
//! # Design
//! These are the canonical, already-reconciled shapes that views work with.
//! They are never the wire format: the backend's `title`/`name` duality and
//! its envelope variants are handled in `codec`, so a `Book` always has one
//! `title` and a non-negative `quantity`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend identifier. Current backends hand out string ids; older ones used
/// integers, which select the legacy body-based routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Text(String),
    Number(i64),
}

impl EntityId {
    pub fn is_blank(&self) -> bool {
        matches!(self, EntityId::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Text(text) => f.write_str(text),
            EntityId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

/// A book as held in view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub id: Option<EntityId>,
    pub title: String,
    pub author: String,
    pub quantity: u32,
    pub genre_id: Option<EntityId>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: EntityId,
    pub name: String,
}

/// Request payload for creating a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGenre {
    pub name: String,
}

/// One page of books in canonical form, whatever envelope carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub books: Vec<Book>,
    /// Always at least 1.
    pub total_pages: u32,
    pub total_items: Option<u64>,
}

impl BookPage {
    pub fn single(books: Vec<Book>) -> Self {
        Self {
            books,
            total_pages: 1,
            total_items: None,
        }
    }
}
