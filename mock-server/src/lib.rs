//! In-memory stand-in for the catalog backend.
//!
//! Serves both the RESTful routes and the legacy query/body routes, stores
//! books under `name` and mirrors it into `title` on every book it returns,
//! and reports errors as `{"error": "...", "code": <status>}`. The list
//! envelope is selectable so clients can be exercised against each shape.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const DEFAULT_PER_PAGE: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub author: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub genre_id: Option<String>,
}

#[derive(Deserialize)]
pub struct GenreInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct IdBody {
    pub id: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    per_page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyIdParams {
    id: Option<String>,
    genre_id: Option<String>,
}

/// Which envelope `GET /books` answers with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListShape {
    /// `{data, page, per_page, total_books, total_pages}`; `data` is `null`
    /// when the page is empty.
    #[default]
    Flat,
    /// `{data, pagination: {total_pages, total_items, ...}}`.
    Nested,
    /// A bare array of every book, unpaginated.
    Bare,
}

#[derive(Debug, Default)]
pub struct Store {
    books: HashMap<String, Book>,
    genres: Vec<Genre>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    shape: ListShape,
}

/// Error body in the backend's `{error, code}` format.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "book not found")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message, "code": self.status.as_u16() });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with(ListShape::default())
}

pub fn app_with(shape: ListShape) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/batch", post(create_books))
        .route("/books/get", get(get_book_legacy))
        .route("/books/update", put(update_book_legacy))
        .route("/books/delete", delete(delete_book_legacy))
        .route("/books/{id}", get(get_book).put(update_book).delete(delete_book))
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/books", get(books_by_genre_legacy))
        .route("/genres/{id}/books", get(books_by_genre))
        .with_state(AppState { db, shape })
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, shape: ListShape) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(shape)).await
}

fn positive(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Mirror `name` into `title` the way every read endpoint does.
fn present(book: &Book) -> Book {
    Book {
        title: book.name.clone(),
        ..book.clone()
    }
}

fn sorted(store: &Store) -> Vec<Book> {
    let mut books: Vec<Book> = store.books.values().map(present).collect();
    books.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.id.cmp(&b.id)));
    books
}

fn validate(store: &Store, input: &BookInput) -> Result<(String, String), ApiFailure> {
    let name = if input.title.trim().is_empty() {
        input.name.trim()
    } else {
        input.title.trim()
    };
    if name.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "title is required"));
    }
    let author = input.author.trim();
    if author.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "author is required"));
    }
    if input.quantity < 0 {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "quantity cannot be negative",
        ));
    }
    if let Some(genre_id) = &input.genre_id {
        if !store.genres.iter().any(|g| &g.id == genre_id) {
            return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "genre not found"));
        }
    }
    Ok((name.to_string(), author.to_string()))
}

async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let store = state.db.read().await;
    let books = sorted(&store);
    if state.shape == ListShape::Bare {
        return Json(json!(books));
    }

    let page = positive(params.page.as_deref(), 1);
    let per_page = positive(params.per_page.as_deref(), DEFAULT_PER_PAGE);
    let total = books.len();
    let total_pages = total.div_ceil(per_page);
    let data: Vec<Book> = books
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    match state.shape {
        ListShape::Nested => Json(json!({
            "data": data,
            "pagination": {
                "current_page": page,
                "per_page": per_page,
                "total_items": total,
                "total_pages": total_pages,
                "has_previous": page > 1,
                "has_next": page < total_pages,
            }
        })),
        _ => {
            let data = if data.is_empty() { Value::Null } else { json!(data) };
            Json(json!({
                "data": data,
                "page": page,
                "per_page": per_page,
                "total_books": total,
                "total_pages": total_pages,
            }))
        }
    }
}

async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<BookInput>,
) -> Result<(StatusCode, Json<Book>), ApiFailure> {
    let mut store = state.db.write().await;
    let (name, author) = validate(&store, &input)?;
    let book = Book {
        id: Uuid::new_v4().to_string(),
        name,
        title: String::new(),
        author,
        quantity: input.quantity,
        genre_id: input.genre_id,
    };
    store.books.insert(book.id.clone(), book.clone());
    Ok((StatusCode::CREATED, Json(present(&book))))
}

/// Invalid entries are skipped rather than failing the whole batch.
async fn create_books(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<BookInput>>,
) -> (StatusCode, Json<Value>) {
    let mut store = state.db.write().await;
    let mut created = Vec::new();
    for input in inputs {
        let Ok((name, author)) = validate(&store, &input) else {
            continue;
        };
        let book = Book {
            id: Uuid::new_v4().to_string(),
            name,
            title: String::new(),
            author,
            quantity: input.quantity,
            genre_id: input.genre_id,
        };
        store.books.insert(book.id.clone(), book.clone());
        created.push(present(&book));
    }
    let body = json!({
        "message": format!("{} books created", created.len()),
        "books": created,
    });
    (StatusCode::CREATED, Json(body))
}

async fn find(db: &Db, id: &str) -> Result<Json<Book>, ApiFailure> {
    let store = db.read().await;
    store
        .books
        .get(id)
        .map(|b| Json(present(b)))
        .ok_or_else(ApiFailure::not_found)
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiFailure> {
    find(&state.db, &id).await
}

async fn get_book_legacy(
    State(state): State<AppState>,
    Query(params): Query<LegacyIdParams>,
) -> Result<Json<Book>, ApiFailure> {
    let id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiFailure::new(StatusCode::BAD_REQUEST, "book id not provided"))?;
    find(&state.db, &id).await
}

async fn replace(db: &Db, id: &str, input: BookInput) -> Result<Json<Book>, ApiFailure> {
    let mut store = db.write().await;
    let (name, author) = validate(&store, &input)?;
    let book = store.books.get_mut(id).ok_or_else(ApiFailure::not_found)?;
    book.name = name;
    book.author = author;
    book.quantity = input.quantity;
    book.genre_id = input.genre_id;
    Ok(Json(present(book)))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> Result<Json<Book>, ApiFailure> {
    replace(&state.db, &id, input).await
}

async fn update_book_legacy(
    State(state): State<AppState>,
    Json(input): Json<BookInput>,
) -> Result<Json<Book>, ApiFailure> {
    let id = input
        .id
        .as_ref()
        .and_then(id_text)
        .ok_or_else(|| ApiFailure::new(StatusCode::BAD_REQUEST, "book id not provided"))?;
    replace(&state.db, &id, input).await
}

async fn remove(db: &Db, id: &str) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    store
        .books
        .remove(id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(ApiFailure::not_found)
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    remove(&state.db, &id).await
}

async fn delete_book_legacy(
    State(state): State<AppState>,
    Json(body): Json<IdBody>,
) -> Result<StatusCode, ApiFailure> {
    let id = id_text(&body.id)
        .ok_or_else(|| ApiFailure::new(StatusCode::BAD_REQUEST, "book id not provided"))?;
    remove(&state.db, &id).await
}

async fn list_genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.db.read().await.genres.clone())
}

async fn create_genre(
    State(state): State<AppState>,
    Json(input): Json<GenreInput>,
) -> Result<(StatusCode, Json<Genre>), ApiFailure> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "genre name is required"));
    }
    let genre = Genre {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: input.description,
    };
    state.db.write().await.genres.push(genre.clone());
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn by_genre(db: &Db, genre_id: &str) -> Json<Vec<Book>> {
    let store = db.read().await;
    let books = sorted(&store)
        .into_iter()
        .filter(|b| b.genre_id.as_deref() == Some(genre_id))
        .collect();
    Json(books)
}

async fn books_by_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Book>> {
    by_genre(&state.db, &id).await
}

async fn books_by_genre_legacy(
    State(state): State<AppState>,
    Query(params): Query<LegacyIdParams>,
) -> Result<Json<Vec<Book>>, ApiFailure> {
    let genre_id = params
        .genre_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiFailure::new(StatusCode::BAD_REQUEST, "genre id is required"))?;
    Ok(by_genre(&state.db, &genre_id).await)
}
