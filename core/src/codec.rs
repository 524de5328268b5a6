//! Wire encoding and decoding for book and genre payloads.
//!
//! # Design
//! The backend historically stored a book's title as `name`. Outgoing
//! payloads therefore always carry both keys with the same value
//! ([`BookPayload`]), and incoming records may carry either; [`BookRecord`]
//! reconciles them into `Book::title`, preferring a non-empty `title`.
//!
//! List responses arrive in several envelopes. Each known envelope is a
//! variant of an untagged enum and is mapped into [`BookPage`]; a body that
//! matches none of them is a decode error rather than an empty list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{Book, BookPage, EntityId, Genre};

/// Parse a user-entered quantity from its leading base-10 digits, so
/// `"7abc"` is 7 and `"3.9"` is 3. No digits, a negative sign or overflow
/// give 0.
pub fn parse_quantity(input: &str) -> u32 {
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().unwrap_or(0)
}

/// A book record as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookRecord {
    #[serde(default, deserialize_with = "optional_id")]
    id: Option<EntityId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    quantity: u32,
    #[serde(default, deserialize_with = "optional_id")]
    genre_id: Option<EntityId>,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        let title = record
            .title
            .filter(|t| !t.is_empty())
            .or(record.name)
            .unwrap_or_default();
        Book {
            id: record.id,
            title,
            author: record.author.unwrap_or_default(),
            quantity: record.quantity,
            genre_id: record.genre_id,
        }
    }
}

/// A book payload as the backend expects it. `name` always mirrors `title`.
#[derive(Debug, Serialize)]
pub struct BookPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a EntityId>,
    title: &'a str,
    name: &'a str,
    author: &'a str,
    quantity: u32,
    genre_id: Option<&'a EntityId>,
}

impl<'a> BookPayload<'a> {
    pub fn new(book: &'a Book) -> Self {
        Self {
            id: book.id.as_ref().filter(|id| !id.is_blank()),
            title: &book.title,
            name: &book.title,
            author: &book.author,
            quantity: book.quantity,
            genre_id: book.genre_id.as_ref().filter(|id| !id.is_blank()),
        }
    }
}

pub fn encode_book(book: &Book) -> Result<String, ApiError> {
    let payload = BookPayload::new(book);
    tracing::debug!(?payload, "encoding book payload");
    serde_json::to_string(&payload).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub fn encode_books(books: &[Book]) -> Result<String, ApiError> {
    let payloads: Vec<BookPayload<'_>> = books.iter().map(BookPayload::new).collect();
    serde_json::to_string(&payloads).map_err(|e| ApiError::Serialization(e.to_string()))
}

pub fn decode_book(body: &str) -> Result<Book, ApiError> {
    serde_json::from_str::<BookRecord>(body)
        .map(Book::from)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct PaginationInfo {
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    total_items: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BookListEnvelope {
    Bare(Vec<BookRecord>),
    Nested {
        #[serde(deserialize_with = "null_as_empty")]
        data: Vec<BookRecord>,
        pagination: PaginationInfo,
    },
    Flat {
        #[serde(deserialize_with = "null_as_empty")]
        data: Vec<BookRecord>,
        #[serde(default)]
        total_pages: Option<u32>,
        #[serde(default)]
        total_books: Option<u64>,
    },
}

impl From<BookListEnvelope> for BookPage {
    fn from(envelope: BookListEnvelope) -> Self {
        let (records, total_pages, total_items) = match envelope {
            BookListEnvelope::Bare(records) => (records, None, None),
            BookListEnvelope::Nested { data, pagination } => {
                (data, pagination.total_pages, pagination.total_items)
            }
            BookListEnvelope::Flat {
                data,
                total_pages,
                total_books,
            } => (data, total_pages, total_books),
        };
        BookPage {
            books: records.into_iter().map(Book::from).collect(),
            total_pages: total_pages.unwrap_or(1).max(1),
            total_items,
        }
    }
}

/// Decode a `GET /books` body into one page.
pub fn decode_book_page(body: &str) -> Result<BookPage, ApiError> {
    if body.trim().is_empty() {
        return Ok(BookPage::single(Vec::new()));
    }
    match serde_json::from_str::<Option<BookListEnvelope>>(body) {
        Ok(Some(envelope)) => Ok(envelope.into()),
        Ok(None) => Ok(BookPage::single(Vec::new())),
        Err(e) => {
            tracing::warn!(error = %e, "unrecognized book list envelope");
            Err(ApiError::Decode("unrecognized book list envelope".to_string()))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BookCollection {
    Bare(Vec<BookRecord>),
    Data {
        #[serde(deserialize_with = "null_as_empty")]
        data: Vec<BookRecord>,
    },
    Books {
        #[serde(deserialize_with = "null_as_empty")]
        books: Vec<BookRecord>,
    },
}

/// Decode a plain collection of books (batch create, books by genre).
pub fn decode_book_collection(body: &str) -> Result<Vec<Book>, ApiError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records = match serde_json::from_str::<Option<BookCollection>>(body) {
        Ok(None) => Vec::new(),
        Ok(Some(BookCollection::Bare(records)))
        | Ok(Some(BookCollection::Data { data: records }))
        | Ok(Some(BookCollection::Books { books: records })) => records,
        Err(_) => return Err(ApiError::Decode("unrecognized book collection".to_string())),
    };
    Ok(records.into_iter().map(Book::from).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenreList {
    Bare(Vec<Genre>),
    Data { data: Vec<Genre> },
}

pub fn decode_genres(body: &str) -> Result<Vec<Genre>, ApiError> {
    match serde_json::from_str::<GenreList>(body) {
        Ok(GenreList::Bare(genres)) | Ok(GenreList::Data { data: genres }) => Ok(genres),
        Err(_) => Err(ApiError::Decode("unexpected genre list format".to_string())),
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EntityId>::deserialize(deserializer)?.filter(|id| !id.is_blank()))
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_u64() {
            Some(q) => u32::try_from(q).unwrap_or(u32::MAX),
            None => n
                .as_f64()
                .filter(|q| q.is_finite() && *q >= 0.0)
                .map(|q| q.min(u32::MAX as f64) as u32)
                .unwrap_or(0),
        },
        Value::String(s) => parse_quantity(&s),
        _ => 0,
    };
    Ok(quantity)
}
