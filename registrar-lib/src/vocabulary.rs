//! The server-published vocabulary of valid query parameters.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

#[cfg(feature = "serde_support")]
use serde::Serialize;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    envelope::Envelope,
    error::{Error, Result},
    fetch::Fetcher,
};

/// Every parameter map the registrar publishes, each mapping a valid key to a label.
#[derive(Debug, Default, Clone, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
pub struct Vocabulary {
    #[serde(default)]
    pub acceptable_search_url_parameters_map: HashMap<String, String>,
    #[serde(default)]
    pub activity_map: HashMap<String, String>,
    #[serde(default)]
    pub available_terms_map: HashMap<String, String>,
    #[serde(default)]
    pub course_level_at_or_above_map: HashMap<String, String>,
    #[serde(default)]
    pub course_level_at_or_below_map: HashMap<String, String>,
    #[serde(default)]
    pub departments_map: HashMap<String, String>,
    #[serde(default)]
    pub ends_at_or_after_hour_map: HashMap<String, String>,
    // The server misspells this key.
    #[serde(default, alias = "fulfills_requiremement_map")]
    pub fulfills_requirement_map: HashMap<String, String>,
    #[serde(default)]
    pub program_map: HashMap<String, String>,
    #[serde(default)]
    pub starts_at_or_after_hour_map: HashMap<String, String>,
    #[serde(default)]
    pub starts_on_day_map: HashMap<String, String>,
}

/// Names one of the maps in a [`Vocabulary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyKey {
    SearchParameters,
    Activities,
    Terms,
    CourseLevelAtOrAbove,
    CourseLevelAtOrBelow,
    Departments,
    EndsAtOrAfterHour,
    FulfillsRequirement,
    Programs,
    StartsAtOrAfterHour,
    StartsOnDay,
}

impl Vocabulary {
    pub fn get(&self, key: VocabularyKey) -> &HashMap<String, String> {
        match key {
            VocabularyKey::SearchParameters => &self.acceptable_search_url_parameters_map,
            VocabularyKey::Activities => &self.activity_map,
            VocabularyKey::Terms => &self.available_terms_map,
            VocabularyKey::CourseLevelAtOrAbove => &self.course_level_at_or_above_map,
            VocabularyKey::CourseLevelAtOrBelow => &self.course_level_at_or_below_map,
            VocabularyKey::Departments => &self.departments_map,
            VocabularyKey::EndsAtOrAfterHour => &self.ends_at_or_after_hour_map,
            VocabularyKey::FulfillsRequirement => &self.fulfills_requirement_map,
            VocabularyKey::Programs => &self.program_map,
            VocabularyKey::StartsAtOrAfterHour => &self.starts_at_or_after_hour_map,
            VocabularyKey::StartsOnDay => &self.starts_on_day_map,
        }
    }

    /// Fails with [`Error::UnknownTerm`] unless `term` is an available term.
    pub fn check_term(&self, term: &str) -> Result<()> {
        if self.available_terms_map.contains_key(term) {
            Ok(())
        } else {
            Err(Error::UnknownTerm {
                term: term.to_owned(),
            })
        }
    }

    /// Fails with [`Error::UnsupportedParameter`] unless `key` is an accepted search
    /// parameter.
    pub fn check_search_parameter(&self, key: &str) -> Result<()> {
        if self.acceptable_search_url_parameters_map.contains_key(key) {
            Ok(())
        } else {
            Err(Error::UnsupportedParameter {
                key: key.to_owned(),
            })
        }
    }
}

type Slot = Option<std::result::Result<Arc<Vocabulary>, Arc<Error>>>;

/// Fetches the [`Vocabulary`] once and shares it from then on.
///
/// The first caller performs the fetch while holding the lock, so concurrent first callers
/// wait for it instead of issuing their own. The outcome, success or failure, is kept for the
/// lifetime of the cache.
pub struct ParameterCache<F> {
    fetcher: Arc<F>,
    url: String,
    slot: Mutex<Slot>,
}

impl<F: Fetcher> ParameterCache<F> {
    pub fn new(fetcher: Arc<F>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            slot: Mutex::new(None),
        }
    }

    /// A cache that is already populated and never fetches.
    pub fn with_vocabulary(fetcher: Arc<F>, url: impl Into<String>, vocabulary: Vocabulary) -> Self {
        Self {
            fetcher,
            url: url.into(),
            slot: Mutex::new(Some(Ok(Arc::new(vocabulary)))),
        }
    }

    /// The sub-map named by `key`.
    pub fn get(&self, key: VocabularyKey) -> Result<HashMap<String, String>> {
        Ok(self.fetch_once()?.get(key).clone())
    }

    /// Return the vocabulary, fetching it if no caller has yet.
    pub fn fetch_once(&self) -> Result<Arc<Vocabulary>> {
        // Holding the guard across the fetch is what keeps it to a single request.
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert_with(|| {
            debug!(url = %self.url, "fetching parameter vocabulary");
            self.fetch().map(Arc::new).map_err(|err| {
                warn!(error = %err, "parameter vocabulary fetch failed");
                Arc::new(err)
            })
        })
        .clone()
        .map_err(Error::Vocabulary)
    }

    fn fetch(&self) -> Result<Vocabulary> {
        let body = self.fetcher.fetch(&self.url, &[])?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        if let Some(message) = envelope.service_meta.error_message() {
            return Err(Error::Upstream(message));
        }

        let document = envelope
            .result_data
            .first()
            .ok_or(Error::EmptyVocabulary)?;
        Ok(serde_json::from_str(document.get())?)
    }
}
