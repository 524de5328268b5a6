//! Book operations on `CatalogClient`.
//!
//! Every payload goes through `codec::encode_book`, so create, update and
//! batch bodies all carry `name == title`. Where a book has no usable id the
//! legacy query/body routes are used instead of the RESTful ones.

use crate::client::{check_status, CatalogClient};
use crate::codec;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Book, BookPage, EntityId};

impl CatalogClient {
    /// `GET /books?page=&per_page=`. Both values are clamped to at least 1.
    pub fn build_list_books(&self, page: u32, per_page: u32) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["books"],
            &[
                ("page", page.max(1).to_string()),
                ("per_page", per_page.max(1).to_string()),
            ],
            None,
        )
    }

    /// `GET /books/{id}`, or the legacy `GET /books/get` without an id.
    pub fn build_get_book(&self, id: Option<&EntityId>) -> HttpRequest {
        match id.filter(|id| !id.is_blank()) {
            Some(id) => {
                let id = id.to_string();
                self.request(HttpMethod::Get, &["books", id.as_str()], &[], None)
            }
            None => self.request(HttpMethod::Get, &["books", "get"], &[], None),
        }
    }

    pub fn build_create_book(&self, book: &Book) -> Result<HttpRequest, ApiError> {
        let body = codec::encode_book(book)?;
        Ok(self.request(HttpMethod::Post, &["books"], &[], Some(body)))
    }

    /// `PUT /books/{id}`, or the legacy `PUT /books/update` when the book
    /// carries no id.
    pub fn build_update_book(&self, book: &Book) -> Result<HttpRequest, ApiError> {
        let body = codec::encode_book(book)?;
        let request = match book.id.as_ref().filter(|id| !id.is_blank()) {
            Some(id) => {
                let id = id.to_string();
                self.request(HttpMethod::Put, &["books", id.as_str()], &[], Some(body))
            }
            None => self.request(HttpMethod::Put, &["books", "update"], &[], Some(body)),
        };
        Ok(request)
    }

    /// `DELETE /books/{id}` for string ids; numeric ids go through the legacy
    /// `DELETE /books/delete` with an `{"id": n}` body.
    pub fn build_delete_book(&self, id: &EntityId) -> Result<HttpRequest, ApiError> {
        match id {
            EntityId::Text(text) => {
                Ok(self.request(HttpMethod::Delete, &["books", text.as_str()], &[], None))
            }
            EntityId::Number(_) => {
                let body = serde_json::to_string(&serde_json::json!({ "id": id }))
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                Ok(self.request(HttpMethod::Delete, &["books", "delete"], &[], Some(body)))
            }
        }
    }

    /// `POST /books/batch` with an array body.
    pub fn build_create_books(&self, books: &[Book]) -> Result<HttpRequest, ApiError> {
        let body = codec::encode_books(books)?;
        Ok(self.request(HttpMethod::Post, &["books", "batch"], &[], Some(body)))
    }

    pub fn parse_list_books(&self, response: HttpResponse) -> Result<BookPage, ApiError> {
        check_status(&response)?;
        codec::decode_book_page(&response.body)
    }

    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        check_status(&response)?;
        codec::decode_book(&response.body)
    }

    pub fn parse_create_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        check_status(&response)?;
        codec::decode_book(&response.body)
    }

    pub fn parse_update_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        check_status(&response)?;
        codec::decode_book(&response.body)
    }

    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_create_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        check_status(&response)?;
        codec::decode_book_collection(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;

    fn client() -> CatalogClient {
        CatalogClient::new("http://localhost:3001").unwrap()
    }

    fn ok(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn body_of(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn dune() -> Book {
        Book {
            id: Some(EntityId::from("2Mx1")),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            quantity: 4,
            genre_id: None,
        }
    }

    #[test]
    fn build_list_books_produces_correct_request() {
        let req = client().build_list_books(2, 20);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/books?page=2&per_page=20");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_books_clamps_to_one() {
        let req = client().build_list_books(0, 0);
        assert_eq!(req.path, "http://localhost:3001/books?page=1&per_page=1");
    }

    #[test]
    fn build_get_book_prefers_id_route() {
        let id = EntityId::from("2Mx1");
        let req = client().build_get_book(Some(&id));
        assert_eq!(req.path, "http://localhost:3001/books/2Mx1");
    }

    #[test]
    fn build_get_book_without_id_uses_legacy_route() {
        let req = client().build_get_book(None);
        assert_eq!(req.path, "http://localhost:3001/books/get");
        let blank = EntityId::from("");
        let req = client().build_get_book(Some(&blank));
        assert_eq!(req.path, "http://localhost:3001/books/get");
    }

    #[test]
    fn build_create_book_mirrors_title() {
        let req = client().build_create_book(&Book::new("Dune", "Frank Herbert")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3001/books");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body = body_of(&req);
        assert_eq!(body["name"], "Dune");
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["quantity"], 0);
        assert!(body["genre_id"].is_null());
    }

    #[test]
    fn build_update_book_with_id() {
        let req = client().build_update_book(&dune()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3001/books/2Mx1");
        let body = body_of(&req);
        assert_eq!(body["id"], "2Mx1");
        assert_eq!(body["name"], body["title"]);
    }

    #[test]
    fn build_update_book_without_id_uses_legacy_route() {
        let mut book = dune();
        book.id = None;
        let req = client().build_update_book(&book).unwrap();
        assert_eq!(req.path, "http://localhost:3001/books/update");
        assert!(body_of(&req).get("id").is_none());
    }

    #[test]
    fn build_delete_book_routes_by_id_kind() {
        let req = client().build_delete_book(&EntityId::from("2Mx1")).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3001/books/2Mx1");
        assert!(req.body.is_none());

        let req = client().build_delete_book(&EntityId::Number(42)).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3001/books/delete");
        assert_eq!(body_of(&req), serde_json::json!({ "id": 42 }));
    }

    #[test]
    fn build_create_books_sends_array() {
        let req = client().build_create_books(&[dune(), Book::new("Emma", "Austen")]).unwrap();
        assert_eq!(req.path, "http://localhost:3001/books/batch");
        assert_eq!(body_of(&req).as_array().unwrap().len(), 2);
    }

    #[test]
    fn parse_list_books_success() {
        let page = client()
            .parse_list_books(ok(200, r#"{"data":[{"id":"1","name":"Dune","author":"FH","quantity":1}],"total_pages":2}"#))
            .unwrap();
        assert_eq!(page.books[0].title, "Dune");
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn parse_get_book_not_found() {
        let err = client()
            .parse_get_book(ok(404, r#"{"error":"Livro não encontrado","code":404}"#))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.report().message, "Livro não encontrado");
    }

    #[test]
    fn parse_create_book_accepts_201() {
        let book = client()
            .parse_create_book(ok(201, r#"{"id":"9","name":"Dune","title":"Dune","author":"FH","quantity":3}"#))
            .unwrap();
        assert_eq!(book.id, Some(EntityId::from("9")));
        assert_eq!(book.quantity, 3);
    }

    #[test]
    fn parse_update_book_wrong_status() {
        let err = client().parse_update_book(ok(500, "internal error")).unwrap_err();
        assert_eq!(err.report().status, Some(ErrorStatus::Http(500)));
    }

    #[test]
    fn parse_delete_book_success() {
        assert!(client().parse_delete_book(ok(204, "")).is_ok());
    }

    #[test]
    fn parse_create_books_reads_batch_result() {
        let books = client()
            .parse_create_books(ok(201, r#"{"message":"1 livros criados com sucesso","books":[{"id":"1","name":"Dune"}]}"#))
            .unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }
}
