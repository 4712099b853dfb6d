#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use hyper::body::Bytes;
use registrar_lib::{Fetcher, TransportError};
use serde_json::{json, Value};

/// A fetcher that replays scripted responses and records every request.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<VecDeque<Result<Vec<u8>, String>>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn respond(self, body: Value) -> Self {
        self.push(Ok(body.to_string().into_bytes()));
        self
    }

    pub fn respond_raw(self, body: &str) -> Self {
        self.push(Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Err(message.to_owned()));
        self
    }

    fn push(&self, response: Result<Vec<u8>, String>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().unwrap().clone()
    }

    /// Value of `key` in the query of the `index`th request.
    pub fn param(&self, index: usize, key: &str) -> Option<String> {
        self.requests()
            .get(index)?
            .1
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str, query: &[(String, String)]) -> Result<Bytes, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((url.to_owned(), query.to_vec()));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(Bytes::from(body)),
            Some(Err(message)) => Err(TransportError::Connection(message)),
            None => Err(TransportError::Connection("no scripted response".to_owned())),
        }
    }
}

/// One page of an envelope with `rows`.
pub fn page(rows: Value, current: u32, total: u32) -> Value {
    let next = if current < total { current + 1 } else { current };
    json!({
        "result_data": rows,
        "service_meta": {
            "current_page_number": current,
            "next_page_number": next,
            "number_of_pages": total,
            "previous_page_number": current.saturating_sub(1),
            "results_per_page": 2,
            "error_text": "",
        }
    })
}

pub fn vocabulary() -> Value {
    json!({
        "result_data": [{
            "available_terms_map": {
                "2022A": "Spring 2022",
                "2022C": "Fall 2022",
            },
            "acceptable_search_url_parameters_map": {
                "course_id": "Course",
                "term": "Term",
                "instructor": "Instructor",
            },
            "departments_map": {
                "CIS": "Computer and Information Science",
                "NETS": "Networked and Social Systems",
            },
            "fulfills_requiremement_map": {
                "MDS": "Society Sector",
            },
        }],
        "service_meta": {
            "current_page_number": 1,
            "number_of_pages": 1,
            "error_text": "",
        }
    })
}
