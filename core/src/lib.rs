//! Synchronous API client core for the book catalog service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the request layer
//! sit the view models of the catalog screens (book list, book/genre form),
//! which emit requests as commands and consume their outcomes.
//!
//! # Design
//! - `CatalogClient` is stateless; it holds only the base URL.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `codec` owns the backend's wire quirks: the `title`/`name` mirror and
//!   the paginated envelope variants.
//! - Every failure a view can show is an `ApiError` reduced to an
//!   `ErrorReport { message, status }`.

pub mod books;
pub mod client;
pub mod codec;
pub mod error;
pub mod genres;
pub mod http;
pub mod types;
pub mod views;

pub use client::{CatalogClient, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorReport, ErrorStatus, TransportError};
pub use http::{send, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{Book, BookPage, EntityId, Genre, NewGenre};
pub use views::{drive, BookListView, Command, FormTarget, FormView, Route, View};
