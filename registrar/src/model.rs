use registrar_lib::CourseCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ParsedCode {
    pub canonical: String,
    pub course_id: String,
    pub subject: String,
    pub number: u16,
    pub level: Option<char>,
    pub section: String,
}

impl From<&CourseCode> for ParsedCode {
    fn from(code: &CourseCode) -> Self {
        ParsedCode {
            canonical: code.as_str().to_owned(),
            course_id: code.course_id().to_owned(),
            subject: code.subject().to_owned(),
            number: code.number(),
            level: code.level(),
            section: code.section().to_owned(),
        }
    }
}
