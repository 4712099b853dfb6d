//! Course section identifiers.
//!
//! The registrar accepts and returns course sections in a handful of surface forms
//! (`CIS1200001`, `CIS-1200-001`, `CIS 1200 001`). [`CourseCode`] validates any of them
//! and converges on a single canonical string, which is the only form that is compared.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
#[cfg(feature = "serde_support")]
use serde::{Serialize, Serializer};
use thiserror::Error;

// Subject, optional separator, number with an optional level letter, optional separator,
// section.
const STANDARD_FORMAT: &str =
    r"^([a-zA-Z]{2,4})\s*-?\s*([0-9]{2,4}[aAbB]?)\s*-?\s*([0-9a-zA-Z]{3})$";
// Older deployments used three digit course numbers and no level letters.
const LEGACY_FORMAT: &str = r"^([a-zA-Z]{2,4})\s*-?\s*([0-9]{3})\s*-?\s*([0-9a-zA-Z]{3})$";

const SUBJECT_LEN: (usize, usize) = (2, 4);
const SECTION_LEN: usize = 3;

/// A versioned course code grammar.
///
/// Each deployment of the registrar API settled on slightly different rules, so the grammar
/// is picked up front through [`CodeFormat`] rather than guessed from the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Grammar {
    /// Numbers `1..=9999` written with 2 to 4 digits, optionally followed by an `A`/`B`
    /// level letter.
    #[default]
    Standard,
    /// Numbers `1..=999` written with exactly 3 digits, no level letter.
    Legacy,
}

impl Grammar {
    fn regex(self) -> &'static Regex {
        static STANDARD: OnceLock<Regex> = OnceLock::new();
        static LEGACY: OnceLock<Regex> = OnceLock::new();

        match self {
            Grammar::Standard => STANDARD
                .get_or_init(|| Regex::new(STANDARD_FORMAT).expect("standard format is valid")),
            Grammar::Legacy => {
                LEGACY.get_or_init(|| Regex::new(LEGACY_FORMAT).expect("legacy format is valid"))
            }
        }
    }

    /// Largest course number this grammar accepts.
    pub fn max_number(self) -> u16 {
        match self {
            Grammar::Standard => 9999,
            Grammar::Legacy => 999,
        }
    }

    fn allows_level(self) -> bool {
        matches!(self, Grammar::Standard)
    }

    fn split(self, raw: &str) -> Option<(&str, &str, &str)> {
        let captures = self.regex().captures(raw)?;
        Some((
            captures.get(1)?.as_str(),
            captures.get(2)?.as_str(),
            captures.get(3)?.as_str(),
        ))
    }
}

/// Controls how course codes are validated and rendered.
///
/// Padding is purely a formatting concern: it never changes whether a code is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFormat {
    /// Width the subject is right-padded to with spaces. `0` leaves it unpadded.
    pub subject_width: usize,
    /// Width the course number is left-padded to with zeros, not counting the level letter.
    pub number_width: usize,
    pub grammar: Grammar,
}

impl Default for CodeFormat {
    fn default() -> Self {
        Self {
            subject_width: 0,
            number_width: 4,
            grammar: Grammar::Standard,
        }
    }
}

impl CodeFormat {
    /// Format used by deployments that predate four digit course numbers.
    pub fn legacy() -> Self {
        Self {
            subject_width: 0,
            number_width: 3,
            grammar: Grammar::Legacy,
        }
    }

    /// Parse a course code in any of the accepted surface forms.
    pub fn parse(&self, raw: &str) -> Result<CourseCode, ParseCodeError> {
        let trimmed = raw.trim();
        match self.grammar.split(trimmed) {
            Some((subject, number, section)) => self.build(subject, number, section),
            None => Err(self.diagnose(trimmed)),
        }
    }

    /// Build a course code from already separated fields.
    pub fn build(
        &self,
        subject: &str,
        number: &str,
        section: &str,
    ) -> Result<CourseCode, ParseCodeError> {
        let subject = subject.trim().to_ascii_uppercase();
        if !(SUBJECT_LEN.0..=SUBJECT_LEN.1).contains(&subject.len())
            || !subject.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ParseCodeError::MalformedSubject(subject));
        }

        let (number, level) = self.validate_number(number.trim())?;

        let section = section.trim().to_ascii_uppercase();
        if section.chars().count() != SECTION_LEN
            || !section.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ParseCodeError::InvalidSection(section));
        }

        let mut canonical = format!(
            "{subject:<subject_width$}{number:0number_width$}",
            subject_width = self.subject_width,
            number_width = self.number_width,
        );
        if let Some(level) = level {
            canonical.push(level);
        }
        canonical.push_str(&section);

        Ok(CourseCode {
            canonical,
            subject,
            number,
            level,
            section,
        })
    }

    fn validate_number(&self, raw: &str) -> Result<(u16, Option<char>), ParseCodeError> {
        let invalid = || ParseCodeError::InvalidNumber(raw.to_owned());

        let (digits, level) = match raw.chars().last() {
            Some(c @ ('A' | 'B' | 'a' | 'b')) if self.grammar.allows_level() => {
                (&raw[..raw.len() - 1], Some(c.to_ascii_uppercase()))
            }
            _ => (raw, None),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        // Anything longer than the widest number would overflow `u16` or the range anyway.
        let number = digits.parse::<u32>().map_err(|_| invalid())?;
        if number == 0 || number > u32::from(self.grammar.max_number()) {
            return Err(invalid());
        }

        Ok((number as u16, level))
    }

    // Work out which field made the input fail to match the grammar so callers get an error
    // pointing at the right part.
    fn diagnose(&self, raw: &str) -> ParseCodeError {
        let fields: Vec<&str> = raw
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|field| !field.is_empty())
            .collect();

        match fields.as_slice() {
            [subject, number, section] => self
                .build(subject, number, section)
                .err()
                .unwrap_or_else(|| ParseCodeError::UnrecognizedFormat(raw.to_owned())),
            [tight] => {
                let subject_len = tight
                    .find(|c: char| !c.is_ascii_alphabetic())
                    .unwrap_or(tight.len());
                let (subject, rest) = tight.split_at(subject_len);
                if !(SUBJECT_LEN.0..=SUBJECT_LEN.1).contains(&subject.len()) {
                    return ParseCodeError::MalformedSubject(subject.to_owned());
                }
                if rest.len() <= SECTION_LEN || !rest.is_char_boundary(rest.len() - SECTION_LEN) {
                    return ParseCodeError::InvalidSection(rest.to_owned());
                }
                let (number, section) = rest.split_at(rest.len() - SECTION_LEN);
                self.build(subject, number, section)
                    .err()
                    .unwrap_or_else(|| ParseCodeError::InvalidNumber(number.to_owned()))
            }
            _ => ParseCodeError::UnrecognizedFormat(raw.to_owned()),
        }
    }
}

/// A validated course section identifier.
///
/// Two codes are equal iff their canonical strings are equal.
#[derive(Debug, Clone)]
pub struct CourseCode {
    canonical: String,
    subject: String,
    number: u16,
    level: Option<char>,
    section: String,
}

impl CourseCode {
    /// Parse a course code with the default [`CodeFormat`].
    ///
    /// ```
    /// # use registrar_lib::CourseCode;
    /// let code = CourseCode::parse("CIS-1200-001").unwrap();
    /// assert_eq!(code.as_str(), "CIS1200001");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ParseCodeError> {
        CodeFormat::default().parse(raw)
    }

    /// Build a course code from separate fields with the default [`CodeFormat`].
    pub fn build(subject: &str, number: &str, section: &str) -> Result<Self, ParseCodeError> {
        CodeFormat::default().build(subject, number, section)
    }

    /// The canonical string, e.g. `CIS1200001`.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    /// Trailing level letter of the course number, e.g. the `A` in `CRIM-6004A-301`.
    pub fn level(&self) -> Option<char> {
        self.level
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// The canonical form without the section, used to address a course in the catalog.
    pub fn course_id(&self) -> &str {
        &self.canonical[..self.canonical.len() - self.section.len()]
    }
}

impl PartialEq for CourseCode {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CourseCode {}

impl std::hash::Hash for CourseCode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for CourseCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CourseCode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl FromStr for CourseCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseCode::parse(s)
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

#[cfg(feature = "serde_support")]
impl Serialize for CourseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

/// Represents errors that can occur validating a course code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCodeError {
    /// The subject is not 2 to 4 letters.
    #[error("subject `{0}` must be 2 to 4 letters")]
    MalformedSubject(String),
    /// The course number is not a number in the range allowed by the grammar.
    #[error("course number `{0}` is not a valid course number")]
    InvalidNumber(String),
    /// The section is not exactly 3 alphanumeric characters.
    #[error("section `{0}` must be exactly 3 alphanumeric characters")]
    InvalidSection(String),
    /// The input does not resemble a course code at all.
    #[error("`{0}` is not in a recognized course code format")]
    UnrecognizedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_forms_converge() {
        let tight = CourseCode::parse("CIS1200001").unwrap();
        let hyphenated = CourseCode::parse("CIS-1200-001").unwrap();
        let spaced = CourseCode::parse("CIS 1200 001").unwrap();

        assert_eq!(tight.as_str(), "CIS1200001");
        assert_eq!(tight, hyphenated);
        assert_eq!(tight, spaced);
    }

    #[test]
    fn full_width_subject() {
        let code = CourseCode::parse("NETS1120001").unwrap();
        assert_eq!(code.as_str(), "NETS1120001");
        assert_eq!(code.subject(), "NETS");
        assert_eq!(code.number(), 1120);
        assert_eq!(code.section(), "001");
        assert_eq!(code.course_id(), "NETS1120");
    }

    #[test]
    fn short_numbers_are_zero_padded() {
        let code = CourseCode::parse("cis-120-001").unwrap();
        assert_eq!(code.as_str(), "CIS0120001");
        assert_eq!(code, CourseCode::build("CIS", "0120", "001").unwrap());
    }

    #[test]
    fn level_letter_is_kept() {
        let code = CourseCode::parse("CRIM-6004A-301").unwrap();
        assert_eq!(code.as_str(), "CRIM6004A301");
        assert_eq!(code.level(), Some('A'));
        assert_eq!(code.number(), 6004);

        let lower = CourseCode::parse("crim 6004b 301").unwrap();
        assert_eq!(lower.as_str(), "CRIM6004B301");
    }

    #[test]
    fn zero_is_not_a_course_number() {
        assert!(matches!(
            CourseCode::parse("CIS0000001"),
            Err(ParseCodeError::InvalidNumber(_))
        ));
        assert!(matches!(
            CourseCode::parse("CIS000001"),
            Err(ParseCodeError::InvalidNumber(_))
        ));
    }

    #[test]
    fn number_range() {
        assert!(CourseCode::build("CIS", "9999", "001").is_ok());
        assert!(CourseCode::build("CIS", "1", "001").is_ok());
        assert_eq!(
            CourseCode::build("CIS", "10000", "001"),
            Err(ParseCodeError::InvalidNumber("10000".to_owned()))
        );
        assert_eq!(
            CourseCode::build("CIS", "12x", "001"),
            Err(ParseCodeError::InvalidNumber("12x".to_owned()))
        );
    }

    #[test]
    fn subject_shape() {
        assert!(matches!(
            CourseCode::parse("CISXX000001"),
            Err(ParseCodeError::MalformedSubject(_))
        ));
        assert!(matches!(
            CourseCode::build("C", "120", "001"),
            Err(ParseCodeError::MalformedSubject(_))
        ));
        assert!(matches!(
            CourseCode::build("CI5", "120", "001"),
            Err(ParseCodeError::MalformedSubject(_))
        ));
    }

    #[test]
    fn section_shape() {
        assert!(matches!(
            CourseCode::build("CIS", "120", "01"),
            Err(ParseCodeError::InvalidSection(_))
        ));
        assert!(matches!(
            CourseCode::parse("CIS-1200-0011"),
            Err(ParseCodeError::InvalidSection(_))
        ));
        assert!(matches!(
            CourseCode::build("CIS", "120", "0-1"),
            Err(ParseCodeError::InvalidSection(_))
        ));
    }

    #[test]
    fn garbage_is_unrecognized() {
        assert!(matches!(
            CourseCode::parse("CIS 12 00 001"),
            Err(ParseCodeError::UnrecognizedFormat(_))
        ));
        assert!(CourseCode::parse("").is_err());
    }

    #[test]
    fn at_most_one_hyphen_between_fields() {
        assert_eq!(CourseCode::parse("CIS - 1200 - 001").unwrap().as_str(), "CIS1200001");
        assert!(matches!(
            CourseCode::parse("CIS - - 1200 -- 001"),
            Err(ParseCodeError::UnrecognizedFormat(_))
        ));
        assert!(matches!(
            CourseCode::parse("CIS--1200-001"),
            Err(ParseCodeError::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn build_then_parse_round_trips() {
        for (subject, number, section) in [
            ("CIS", "1200", "001"),
            ("NETS", "112", "201"),
            ("MUSC", "50", "003"),
            ("CRIM", "6004A", "301"),
            ("EE", "9999", "L01"),
        ] {
            let built = CourseCode::build(subject, number, section).unwrap();
            assert_eq!(CourseCode::parse(built.as_str()).unwrap(), built);
        }
    }

    #[test]
    fn subject_padding_is_representation_only() {
        let format = CodeFormat {
            subject_width: 4,
            ..CodeFormat::default()
        };
        let padded = format.parse("CIS-1200-001").unwrap();
        assert_eq!(padded.as_str(), "CIS 1200001");
        assert_eq!(padded.course_id(), "CIS 1200");
        assert_eq!(format.parse(padded.as_str()).unwrap(), padded);
    }

    #[test]
    fn legacy_grammar() {
        let legacy = CodeFormat::legacy();
        assert_eq!(legacy.parse("CIS-120-001").unwrap().as_str(), "CIS120001");
        assert!(matches!(
            legacy.build("CIS", "1200", "001"),
            Err(ParseCodeError::InvalidNumber(_))
        ));
        assert!(matches!(
            legacy.build("CRIM", "600A", "301"),
            Err(ParseCodeError::InvalidNumber(_))
        ));
        assert!(legacy.parse("CIS1200001").is_err());
    }
}
