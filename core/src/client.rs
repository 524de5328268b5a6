//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only the parsed base URL and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the book and genre operations live in `books` and
//! `genres`. The caller executes the round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, CONTENT_TYPE};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Synchronous, stateless client for the catalog API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogClient {
    base_url: Url,
}

impl CatalogClient {
    /// Bind a client to `base_url`. A path prefix such as `/api` is kept.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `segments` below the base, each segment
    /// percent-encoded, with `query` appended in order.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> String {
        let mut url = self.base_url.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url.to_string()
    }

    pub(crate) fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<String>,
    ) -> HttpRequest {
        let headers = match body {
            Some(_) => vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            None => Vec::new(),
        };
        HttpRequest {
            method,
            path: self.endpoint(segments, query),
            headers,
            body,
        }
    }
}

/// Map non-2xx responses to the normalized `ApiError`.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let err = ApiError::from_response(response);
    tracing::warn!(status = response.status, error = %err, "backend returned an error");
    Err(err)
}
