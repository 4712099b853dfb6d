//! A typed client for the Penn OpenData registrar API.
//!
//! [`Registrar`] builds queries, [`PageIterator`] walks paginated results one page at a time,
//! and [`CourseCode`] normalizes course section identifiers.

#[cfg(feature = "rustls")]
mod client;
mod config;
mod course;
mod envelope;
mod error;
mod fetch;
mod model;
mod pagination;
mod registrar;
mod vocabulary;

#[cfg(feature = "rustls")]
pub use client::{Credentials, HyperFetcher};
pub use config::{ClientConfig, OPEN_DATA_URL, TOKEN_URL};
pub use course::{CodeFormat, CourseCode, Grammar, ParseCodeError};
pub use envelope::{unescape_html, Envelope, ErrorFlag, ServiceMeta};
pub use error::{Error, Result};
pub use fetch::{encode_url, Fetcher, TransportError};
pub use model::{
    ActivityCredit, CatalogCourse, CatalogCrosslisting, CourseSection, CourseStatus,
    Crosslisting, Instructor, Meeting,
};
pub use pagination::{Advance, PageIterator, Request};
pub use registrar::Registrar;
pub use vocabulary::{ParameterCache, Vocabulary, VocabularyKey};

/// A [`Registrar`] over the public OpenData endpoint using the default configuration.
#[cfg(feature = "rustls")]
pub fn registrar(credentials: Credentials) -> Result<Registrar<HyperFetcher>> {
    registrar_with_config(credentials, ClientConfig::default())
}

#[cfg(feature = "rustls")]
pub fn registrar_with_config(
    credentials: Credentials,
    config: ClientConfig,
) -> Result<Registrar<HyperFetcher>> {
    let fetcher = HyperFetcher::new(credentials, &config)?;
    Ok(Registrar::new(fetcher, config))
}
