//! Page-number based pagination.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use tracing::{debug, trace, warn};

use crate::{
    envelope::Envelope,
    error::{Error, Result},
    fetch::Fetcher,
};

const PAGE_PARAM: &str = "page_number";
const FIRST_PAGE: u32 = 1;

/// The target of a paginated query: an endpoint and its base query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Set a query parameter, replacing any previous value for `key`.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(key.into(), value.into());
        self
    }

    fn set_param(&mut self, key: String, value: String) {
        match self.query.iter_mut().find(|(name, _)| *name == key) {
            Some((_, old)) => *old = value,
            None => self.query.push((key, value)),
        }
    }
}

/// Outcome of a single [`PageIterator::advance`].
#[derive(Debug)]
#[must_use]
pub enum Advance<'a> {
    /// A page was fetched and is now held by the iterator.
    Continue,
    /// The iterator is terminal, nothing was fetched.
    Exhausted,
    /// The fetch failed. The iterator is now terminal.
    Failed(&'a Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Exhausted,
    Failed,
}

/// A cursor over a page-numbered result set.
///
/// Each [`advance`](PageIterator::advance) performs exactly one fetch and replaces the held
/// page; earlier pages are not retained. Rows are decoded on demand.
///
/// ```no_run
/// # use registrar_lib::{Advance, PageIterator, CatalogCourse, Fetcher, Result};
/// # fn run<F: Fetcher>(mut pages: PageIterator<F>) -> Result<()> {
/// loop {
///     match pages.advance() {
///         Advance::Continue => {}
///         Advance::Exhausted => break,
///         Advance::Failed(err) => {
///             eprintln!("stopped early: {err}");
///             break;
///         }
///     }
///     for course in pages.rows::<CatalogCourse>() {
///         println!("{}", course?.course_title);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct PageIterator<F> {
    fetcher: Arc<F>,
    request: Request,
    page: u32,
    state: State,
    error: Option<Error>,
    envelope: Envelope,
}

impl<F: Fetcher> PageIterator<F> {
    pub fn new(fetcher: Arc<F>, request: Request) -> Self {
        Self {
            fetcher,
            request,
            page: FIRST_PAGE,
            state: State::Active,
            error: None,
            envelope: Envelope::default(),
        }
    }

    /// Fetch the next page.
    ///
    /// Once this has returned [`Advance::Failed`], or returned [`Advance::Continue`] for the
    /// last page, every later call returns [`Advance::Exhausted`] without touching the network.
    pub fn advance(&mut self) -> Advance<'_> {
        if self.state != State::Active {
            return Advance::Exhausted;
        }

        debug!(url = %self.request.url, page = self.page, "requesting page");
        match self.fetch_page() {
            Ok(envelope) => {
                let meta = &envelope.service_meta;
                trace!(
                    current = ?meta.current_page_number,
                    next = ?meta.next_page_number,
                    total = ?meta.number_of_pages,
                    rows = envelope.result_data.len(),
                    "received page"
                );

                let fetched = meta.current_page_number.unwrap_or(self.page);
                let next = meta
                    .next_page_number
                    .filter(|&next| next > fetched)
                    .unwrap_or_else(|| fetched.saturating_add(1));
                self.page = self.page.max(next);
                if meta.is_last_page() {
                    self.state = State::Exhausted;
                }

                self.envelope = envelope;
                self.error = None;
                Advance::Continue
            }
            Err(err) => {
                warn!(url = %self.request.url, page = self.page, error = %err, "page failed");
                self.state = State::Failed;
                self.envelope = Envelope::default();
                Advance::Failed(self.error.insert(err))
            }
        }
    }

    fn fetch_page(&self) -> Result<Envelope> {
        let mut request = self.request.clone();
        request.set_param(PAGE_PARAM.to_owned(), self.page.to_string());

        let body = self.fetcher.fetch(&request.url, &request.query)?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        if let Some(message) = envelope.service_meta.error_message() {
            return Err(Error::Upstream(message));
        }

        Ok(envelope)
    }

    /// Drive the iterator to completion, decoding every row of every page.
    pub fn collect_all<T: DeserializeOwned>(mut self) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        while matches!(self.advance(), Advance::Continue) {
            for index in 0..self.page_size() {
                rows.push(self.decode_row(index)?);
            }
        }

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(rows),
        }
    }
}

impl<F> PageIterator<F> {
    /// The most recent failure, if the iterator stopped because of one.
    pub fn last_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state != State::Active
    }

    /// The page number the next [`advance`](PageIterator::advance) will request.
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Total number of pages reported with the held page.
    pub fn total_pages(&self) -> Option<u32> {
        self.envelope.service_meta.number_of_pages
    }

    /// Number of rows in the held page.
    pub fn page_size(&self) -> usize {
        self.envelope.result_data.len()
    }

    /// The undecoded JSON of row `index` in the held page.
    pub fn raw_row(&self, index: usize) -> Result<&RawValue> {
        self.envelope
            .result_data
            .get(index)
            .map(|row| &**row)
            .ok_or_else(|| Error::RowIndex {
                index,
                len: self.page_size(),
            })
    }

    /// Decode row `index` of the held page into `T`.
    pub fn decode_row<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        Ok(serde_json::from_str(self.raw_row(index)?.get())?)
    }

    /// Lazily decode every row of the held page.
    pub fn rows<'a, T: DeserializeOwned + 'a>(&'a self) -> impl Iterator<Item = Result<T>> + 'a {
        (0..self.page_size()).map(move |index| self.decode_row(index))
    }
}
