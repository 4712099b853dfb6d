//! Typed rows returned by the registrar endpoints.
//!
//! Only commonly used fields are modelled. Absent fields fall back to their defaults, and
//! [`PageIterator::raw_row`](crate::PageIterator::raw_row) gives access to everything else.

use chrono::{DateTime, Utc};
use serde::Deserialize;
#[cfg(feature = "serde_support")]
use serde::Serialize;

use crate::course::{CodeFormat, CourseCode, ParseCodeError};

// TODO: model the requirement and note arrays once their element shape is documented

/// A row of the course section search service.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct CourseSection {
    pub section_id: String,
    pub section_id_normalized: String,
    pub section_number: String,
    pub section_title: String,
    pub course_department: String,
    pub course_number: String,
    pub course_title: String,
    pub course_description: String,
    pub course_status: String,
    pub course_status_normalized: String,
    pub activity: String,
    pub activity_description: String,
    pub credits: String,
    pub credit_type: String,
    pub minimum_credit: String,
    pub maximum_credit: String,
    pub max_enrollment: String,
    pub grade_type: String,
    pub primary_instructor: String,
    pub first_meeting_days: String,
    pub term: String,
    pub term_normalized: String,
    pub term_session: String,
    pub is_cancelled: bool,
    pub is_closed: bool,
    pub is_crosslist_primary: bool,
    pub is_not_scheduled: bool,
    pub is_special_session: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub instructors: Vec<Instructor>,
    pub meetings: Vec<Meeting>,
    pub crosslistings: Vec<Crosslisting>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct Instructor {
    pub name: String,
    pub section_id: String,
    pub term: String,
}

/// A scheduled meeting of a section.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct Meeting {
    pub building_code: String,
    pub building_name: String,
    pub room_number: String,
    pub meeting_days: String,
    pub start_time: String,
    pub end_time: String,
    pub start_hour_24: u32,
    pub start_minutes: u32,
    pub end_hour_24: u32,
    pub end_minutes: u32,
    pub section_id: String,
    pub section_id_normalized: String,
    pub term: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct Crosslisting {
    pub course_id: String,
    pub section_id: String,
    pub subject: String,
    pub is_crosslist_primary: bool,
}

/// A row of the course section status service.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct CourseStatus {
    pub course_section: String,
    pub section_id_normalized: String,
    pub previous_status: String,
    pub status: String,
    pub status_code_normalized: String,
    pub term: String,
}

impl CourseStatus {
    /// The section this status belongs to.
    pub fn course_code(&self, format: &CodeFormat) -> Result<CourseCode, ParseCodeError> {
        format.parse(&self.course_section)
    }

    /// Whether the section is accepting registrations.
    pub fn is_open(&self) -> bool {
        self.status.eq_ignore_ascii_case("O")
    }
}

/// A row of the course catalog service.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct CatalogCourse {
    pub course_id: String,
    pub course_number: String,
    pub course_title: String,
    pub course_description: String,
    pub course_level: String,
    pub course_level_description: String,
    pub course_notes: String,
    pub course_credit_type: String,
    pub course_credit_connector: String,
    pub department: String,
    pub department_of_record: String,
    pub school_code: String,
    pub instructors: String,
    pub prerequisites: String,
    pub corequisites: String,
    pub distribution_requirement: String,
    pub terms_offered_code: String,
    pub terms_offered_description: String,
    pub activities_and_credits: Vec<ActivityCredit>,
    pub crosslistings: Vec<CatalogCrosslisting>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct ActivityCredit {
    pub activity_code: String,
    pub credit: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[serde(default)]
pub struct CatalogCrosslisting {
    pub course_id: String,
    pub section_id: String,
    pub subject: String,
}
