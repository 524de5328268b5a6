//! Genre operations on `CatalogClient`.

use crate::client::{check_status, CatalogClient};
use crate::codec;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Book, EntityId, Genre, NewGenre};

impl CatalogClient {
    pub fn build_list_genres(&self) -> HttpRequest {
        self.request(HttpMethod::Get, &["genres"], &[], None)
    }

    pub fn build_create_genre(&self, input: &NewGenre) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, &["genres"], &[], Some(body)))
    }

    /// `GET /genres/{id}/books`, or the legacy `GET /genres/books?genre_id=`
    /// when no id is given.
    pub fn build_list_books_by_genre(&self, genre_id: Option<&EntityId>) -> HttpRequest {
        match genre_id.filter(|id| !id.is_blank()) {
            Some(id) => {
                let id = id.to_string();
                self.request(HttpMethod::Get, &["genres", id.as_str(), "books"], &[], None)
            }
            None => self.request(
                HttpMethod::Get,
                &["genres", "books"],
                &[("genre_id", String::new())],
                None,
            ),
        }
    }

    pub fn parse_list_genres(&self, response: HttpResponse) -> Result<Vec<Genre>, ApiError> {
        check_status(&response)?;
        codec::decode_genres(&response.body)
    }

    pub fn parse_create_genre(&self, response: HttpResponse) -> Result<Genre, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn parse_list_books_by_genre(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        check_status(&response)?;
        codec::decode_book_collection(&response.body)
    }
}
