//! The authenticated fetch capability the rest of the crate is written against.

use hyper::{body::Bytes, StatusCode};
use thiserror::Error;

/// Performs authenticated GET requests against the registrar.
///
/// Implementations attach credentials and an `Accept: application/json` header. Errors cover
/// connection and transport failures; HTTP status handling is left to the implementation.
pub trait Fetcher: Send + Sync {
    /// Fetch `url` with `query` appended, returning the response body.
    fn fetch(&self, url: &str, query: &[(String, String)]) -> Result<Bytes, TransportError>;
}

/// Append `query` to `url` as an `application/x-www-form-urlencoded` query string.
pub fn encode_url(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_owned();
    }

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

/// Represents errors that can occur sending a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An argument to build the HTTP request was invalid.
    /// See more [here](https://docs.rs/http/0.2.8/http/request/struct.Builder.html#errors)
    #[error("an argument while building an HTTP request was invalid")]
    MalformedHttpArgs(#[from] hyper::http::Error),
    /// Failed to send HTTP request.
    #[error("failed to send HTTP request")]
    HttpRequestFailed(#[from] hyper::Error),
    /// The connection could not be established or was lost.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The server answered with a non-success status and no JSON body.
    #[error("server responded with status {0}")]
    UnexpectedStatus(StatusCode),
    /// The token endpoint rejected the client credentials.
    #[error("could not obtain an access token: {0}")]
    TokenRequestFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_query() {
        let query = vec![
            ("course_id".to_owned(), "CIS 120".to_owned()),
            ("page_number".to_owned(), "2".to_owned()),
        ];
        assert_eq!(
            encode_url("https://example.edu/search", &query),
            "https://example.edu/search?course_id=CIS+120&page_number=2"
        );
        assert_eq!(
            encode_url("https://example.edu/search?a=b", &query[1..]),
            "https://example.edu/search?a=b&page_number=2"
        );
        assert_eq!(
            encode_url("https://example.edu/search", &[]),
            "https://example.edu/search"
        );
    }
}
