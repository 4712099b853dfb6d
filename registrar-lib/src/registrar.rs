use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    config::ClientConfig,
    course::{CourseCode, ParseCodeError},
    error::Result,
    fetch::Fetcher,
    model::CourseStatus,
    pagination::{PageIterator, Request},
    vocabulary::{ParameterCache, Vocabulary, VocabularyKey},
};

const PARAMETERS_PATH: &str = "course_section_search_parameters";
const STATUS_PATH: &str = "course_section_status";
const CATALOG_PATH: &str = "course_info";
const SEARCH_PATH: &str = "course_section_search";

/// Query builders over the registrar endpoints.
///
/// Terms and search parameters are checked against the server's vocabulary before a query is
/// sent. The vocabulary is fetched at most once per `Registrar`.
pub struct Registrar<F> {
    fetcher: Arc<F>,
    config: ClientConfig,
    parameters: ParameterCache<F>,
}

impl<F: Fetcher> Registrar<F> {
    pub fn new(fetcher: F, config: ClientConfig) -> Self {
        let fetcher = Arc::new(fetcher);
        let parameters = ParameterCache::new(fetcher.clone(), config.endpoint(PARAMETERS_PATH));
        Self {
            fetcher,
            config,
            parameters,
        }
    }

    /// A registrar that validates against `vocabulary` instead of fetching one.
    pub fn with_vocabulary(fetcher: F, config: ClientConfig, vocabulary: Vocabulary) -> Self {
        let fetcher = Arc::new(fetcher);
        let parameters = ParameterCache::with_vocabulary(
            fetcher.clone(),
            config.endpoint(PARAMETERS_PATH),
            vocabulary,
        );
        Self {
            fetcher,
            config,
            parameters,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Parse a course code using the configured [`CodeFormat`](crate::CodeFormat).
    pub fn parse_course(&self, raw: &str) -> std::result::Result<CourseCode, ParseCodeError> {
        self.config.code_format.parse(raw)
    }

    pub fn vocabulary(&self) -> Result<Arc<Vocabulary>> {
        self.parameters.fetch_once()
    }

    /// Terms that can be queried, keyed by term code.
    pub fn available_terms(&self) -> Result<HashMap<String, String>> {
        self.parameters.get(VocabularyKey::Terms)
    }

    /// Parameters accepted by [`search`](Registrar::search).
    pub fn search_parameters(&self) -> Result<HashMap<String, String>> {
        self.parameters.get(VocabularyKey::SearchParameters)
    }

    pub fn departments(&self) -> Result<HashMap<String, String>> {
        self.parameters.get(VocabularyKey::Departments)
    }

    /// Status of every section of `course` in `term`.
    pub fn course_status(&self, term: &str, course: &CourseCode) -> Result<Vec<CourseStatus>> {
        self.vocabulary()?.check_term(term)?;
        // Padded subjects carry spaces that are not valid in a path segment.
        let course = course.as_str().replace(' ', "%20");
        let url = self
            .config
            .endpoint(&format!("{STATUS_PATH}/id/{term}/{course}"));
        self.pages(Request::new(url)).collect_all()
    }

    /// Status of every section offered in `term`.
    pub fn all_course_status(&self, term: &str) -> Result<Vec<CourseStatus>> {
        self.vocabulary()?.check_term(term)?;
        let url = self.config.endpoint(&format!("{STATUS_PATH}/{term}/all"));
        self.pages(Request::new(url)).collect_all()
    }

    /// Catalog entries of `department`, optionally narrowed to one course `number`.
    pub fn course_catalog(&self, department: &str, number: Option<&str>) -> PageIterator<F> {
        let mut path = format!("{CATALOG_PATH}/{department}");
        if let Some(number) = number {
            path.push('/');
            path.push_str(number);
        }
        self.pages(Request::new(self.config.endpoint(&path)))
    }

    /// Search course sections.
    ///
    /// Every key must be an accepted search parameter, otherwise this fails with
    /// [`Error::UnsupportedParameter`](crate::Error::UnsupportedParameter) before any
    /// search request is sent.
    pub fn search<I, K, V>(&self, parameters: I) -> Result<PageIterator<F>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Request::new(self.config.endpoint(SEARCH_PATH));
        let mut parameters = parameters.into_iter().peekable();
        if parameters.peek().is_some() {
            let vocabulary = self.vocabulary()?;
            for (key, value) in parameters {
                let key: String = key.into();
                vocabulary.check_search_parameter(&key)?;
                request = request.with_param(key, value);
            }
        }

        debug!(query = ?request.query, "searching course sections");
        Ok(self.pages(request))
    }

    fn pages(&self, request: Request) -> PageIterator<F> {
        PageIterator::new(self.fetcher.clone(), request)
    }
}
