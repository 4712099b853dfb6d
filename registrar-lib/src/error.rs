use std::sync::Arc;

use thiserror::Error;

use crate::fetch::TransportError;

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur querying the registrar.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response body.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response or one of its rows did not have the expected shape.
    #[error("could not decode response")]
    Decode(#[from] serde_json::Error),
    /// The server answered with an error in an otherwise well formed envelope.
    #[error("registrar reported an error: {0}")]
    Upstream(String),
    /// A search parameter is not in the server's vocabulary.
    #[error("parameter `{key}` is not supported")]
    UnsupportedParameter { key: String },
    /// A term is not in the server's vocabulary.
    #[error("term `{term}` does not exist")]
    UnknownTerm { term: String },
    /// A row was requested past the end of the current page.
    #[error("row {index} is out of range for a page of {len} rows")]
    RowIndex { index: usize, len: usize },
    /// The parameter vocabulary document contained no rows.
    #[error("parameter vocabulary response was empty")]
    EmptyVocabulary,
    /// The shared vocabulary fetch failed. Every caller observes the same failure.
    #[error("failed to load the parameter vocabulary")]
    Vocabulary(#[source] Arc<Error>),
}
