//! The wire envelope wrapping one page of results.

use std::{borrow::Cow, sync::OnceLock};

use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::value::RawValue;

const ENTITY_FORMAT: &str = r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);";

/// One page of results as sent by the registrar.
///
/// Rows are kept undecoded until the caller asks for them in a concrete shape.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    // Required: a JSON body without it is not a page.
    pub result_data: Vec<Box<RawValue>>,
    #[serde(default)]
    pub service_meta: ServiceMeta,
}

/// Pagination metadata and error reporting attached to every page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServiceMeta {
    #[serde(default)]
    pub current_page_number: Option<u32>,
    #[serde(default)]
    pub next_page_number: Option<u32>,
    #[serde(default)]
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub previous_page_number: Option<u32>,
    #[serde(default)]
    pub results_per_page: Option<u32>,
    // Deployments disagree on whether this is a flag or the message itself.
    #[serde(default)]
    pub error: Option<ErrorFlag>,
    #[serde(default)]
    pub error_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorFlag {
    Flag(bool),
    Text(String),
}

impl ServiceMeta {
    /// The server-reported error, with HTML entities unescaped, if this page failed.
    pub fn error_message(&self) -> Option<String> {
        let text = self.error_text.as_deref().filter(|text| !text.is_empty());
        let message = match &self.error {
            Some(ErrorFlag::Text(message)) if !message.is_empty() => Some(message.as_str()),
            Some(ErrorFlag::Flag(true)) => Some(text.unwrap_or("unknown error")),
            _ => text,
        }?;

        Some(unescape_html(message).into_owned())
    }

    /// Whether this page is the last one.
    ///
    /// A page without pagination metadata is treated as the only page.
    pub fn is_last_page(&self) -> bool {
        match (self.current_page_number, self.number_of_pages) {
            (Some(current), Some(total)) => current >= total,
            _ => true,
        }
    }
}

/// Replace named and numeric HTML character references with the characters they stand for.
///
/// Unknown named references are left untouched.
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    static ENTITY: OnceLock<Regex> = OnceLock::new();

    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    ENTITY
        .get_or_init(|| Regex::new(ENTITY_FORMAT).expect("entity format is valid"))
        .replace_all(text, |captures: &Captures| {
            let whole = &captures[0];
            let name = &captures[1];
            let decoded = match name.strip_prefix('#') {
                Some(number) => match number.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse().ok(),
                }
                .and_then(char::from_u32),
                None => match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                },
            };

            decoded.map_or_else(|| whole.to_owned(), String::from)
        })
}
