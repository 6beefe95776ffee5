use crate::{
    course::{CourseId, NewCourse},
    instance::NewInstance,
    term::{Semester, Year},
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    fmt::{Display, Formatter, Result as FmtResult},
};
use strum::{AsRefStr, Display as StrumDisplay};

pub const COURSE_ID_MIN_LENGTH: usize = 2;
pub const COURSE_ID_MAX_LENGTH: usize = 20;
pub const TITLE_MIN_LENGTH: usize = 5;
pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MIN_LENGTH: usize = 10;
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;

pub const INVALID_COURSE_ID: &str =
    r#"Invalid course ID format. Use format like "CS 101" or "MATH1001"."#;
pub const TITLE_TOO_SHORT: &str = "Course title must be at least 5 characters long.";
pub const DESCRIPTION_TOO_SHORT: &str = "Description must be at least 10 characters long.";
pub const COURSE_NOT_SELECTED: &str = "Please select a course";
pub const SELF_PREREQUISITE: &str = "A course cannot be its own prerequisite";

lazy_static! {
    // 2-4 letters, an optional space, 3-4 digits (e.g., "CS 101", "MATH1001")
    static ref COURSE_CODE: Regex = Regex::new(r"^[A-Za-z]{2,4}\s?[0-9]{3,4}$").unwrap();
}

/// Form fields that can carry a validation message
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, StrumDisplay, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    CourseId,
    Title,
    Description,
    Prerequisites,
    Year,
    Semester,
}

/// Per-field validation messages for one form
///
/// The form is valid exactly when no field carries a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds errors holding a single message
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Records the outcome of a field validator
    fn check(&mut self, field: Field, outcome: Option<String>) {
        if let Some(message) = outcome {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when valid, otherwise the errors themselves
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Checks a course code entered by the user
///
/// # Arguments
/// * `course_id` - Raw input; surrounding whitespace is ignored
///
/// # Returns
/// `None` if valid, otherwise the message to show next to the field
pub fn validate_course_id(course_id: &str) -> Option<String> {
    let course_id = course_id.trim();
    if course_id.is_empty() {
        return Some("Course ID is required".to_string());
    }

    let length = course_id.chars().count();
    if length < COURSE_ID_MIN_LENGTH {
        return Some(format!(
            "Course ID must be at least {COURSE_ID_MIN_LENGTH} characters"
        ));
    }
    if length > COURSE_ID_MAX_LENGTH {
        return Some(format!(
            "Course ID must be no more than {COURSE_ID_MAX_LENGTH} characters"
        ));
    }

    (!COURSE_CODE.is_match(course_id)).then(|| INVALID_COURSE_ID.to_string())
}

/// Checks a course title (5-100 characters once trimmed)
pub fn validate_course_title(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        return Some("Course title is required".to_string());
    }

    let length = title.chars().count();
    if length < TITLE_MIN_LENGTH {
        Some(TITLE_TOO_SHORT.to_string())
    } else if length > TITLE_MAX_LENGTH {
        Some(format!(
            "Course title must be no more than {TITLE_MAX_LENGTH} characters"
        ))
    } else {
        None
    }
}

/// Checks a course description (10-1000 characters once trimmed)
pub fn validate_description(description: &str) -> Option<String> {
    let description = description.trim();
    if description.is_empty() {
        return Some("Description is required".to_string());
    }

    let length = description.chars().count();
    if length < DESCRIPTION_MIN_LENGTH {
        Some(DESCRIPTION_TOO_SHORT.to_string())
    } else if length > DESCRIPTION_MAX_LENGTH {
        Some(format!(
            "Description must be no more than {DESCRIPTION_MAX_LENGTH} characters"
        ))
    } else {
        None
    }
}

/// Checks the prerequisite list of a course being created
///
/// Ids are compared in canonical form, so `"cs 101"` and `"CS 101"` are duplicates.
///
/// # Arguments
/// * `course_id` - Id of the course the list belongs to
/// * `prerequisites` - Raw prerequisite ids
///
/// # Returns
/// `None` if valid, otherwise the message for the prerequisites field
pub fn validate_prerequisites<S: AsRef<str>>(course_id: &str, prerequisites: &[S]) -> Option<String> {
    let own_id = CourseId::canonical(course_id);
    let mut seen = HashSet::new();

    for prerequisite in prerequisites {
        let id = CourseId::canonical(prerequisite.as_ref());
        if id.is_blank() {
            return Some("Prerequisite IDs must not be empty".to_string());
        }
        if !own_id.is_blank() && id == own_id {
            return Some(SELF_PREREQUISITE.to_string());
        }
        if !seen.insert(id.clone()) {
            return Some(format!("Prerequisite {id} is listed more than once"));
        }
    }

    None
}

/// Parses an integer form value, `None` when the text is not a number
fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Parses and range-checks a year entered as text
fn parse_year(year: &str) -> Result<Year, String> {
    let Some(year) = parse_integer(year) else {
        return Err("Year must be a valid number".to_string());
    };

    let (min, max) = (i64::from(Year::MIN.0), i64::from(Year::MAX.0));
    if year < min || year > max {
        return Err(format!("Year must be between {min} and {max}"));
    }

    Ok(Year(year as u16))
}

/// Parses and range-checks a semester entered as text
fn parse_semester(semester: &str) -> Result<Semester, String> {
    let Some(semester) = parse_integer(semester) else {
        return Err("Semester must be a valid number".to_string());
    };

    let (min, max) = (
        i64::from(Semester::First.number()),
        i64::from(Semester::Second.number()),
    );
    u8::try_from(semester)
        .ok()
        .and_then(|n| Semester::try_from(n).ok())
        .ok_or_else(|| format!("Semester must be between {min} and {max}"))
}

/// Checks a year entered as text
pub fn validate_year(year: &str) -> Option<String> {
    parse_year(year).err()
}

/// Checks a semester entered as text
pub fn validate_semester(semester: &str) -> Option<String> {
    parse_semester(semester).err()
}

/// Checks that a course was picked for an offering
///
/// Whether the course exists is left to the catalog service.
pub fn validate_course_selection(course_id: &str) -> Option<String> {
    course_id
        .trim()
        .is_empty()
        .then(|| COURSE_NOT_SELECTED.to_string())
}

/// Raw input of the "create course" form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct CourseForm {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub prerequisites: Vec<String>,
}

impl CourseForm {
    /// Validates the form and builds the canonical create request
    pub fn into_new_course(&self) -> Result<NewCourse, FormErrors> {
        validate_course_form(self).into_result()?;

        Ok(NewCourse {
            title: self.title.trim().to_string(),
            course_id: CourseId::canonical(&self.course_id),
            description: self.description.trim().to_string(),
            prerequisites: self
                .prerequisites
                .iter()
                .map(|p| CourseId::canonical(p))
                .collect(),
        })
    }
}

/// Raw input of the "create offering" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceForm {
    pub course_id: String,
    pub year: String,
    pub semester: String,
}

impl InstanceForm {
    pub fn new(course_id: impl Into<String>, year: u16, semester: u8) -> Self {
        Self {
            course_id: course_id.into(),
            year: year.to_string(),
            semester: semester.to_string(),
        }
    }

    /// Validates the form and builds the create request
    pub fn into_new_instance(&self) -> Result<NewInstance, FormErrors> {
        let mut errors = FormErrors::new();
        errors.check(Field::CourseId, validate_course_selection(&self.course_id));

        let year = parse_year(&self.year)
            .map_err(|message| errors.insert(Field::Year, message))
            .ok();
        let semester = parse_semester(&self.semester)
            .map_err(|message| errors.insert(Field::Semester, message))
            .ok();

        match (year, semester) {
            (Some(year), Some(semester)) if errors.is_valid() => Ok(NewInstance {
                course_id: CourseId::new(self.course_id.trim()),
                year,
                semester,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&NewInstance> for InstanceForm {
    fn from(instance: &NewInstance) -> Self {
        Self::new(
            instance.course_id.to_string(),
            instance.year.0,
            instance.semester.number(),
        )
    }
}

/// Validates every field of the course form
pub fn validate_course_form(form: &CourseForm) -> FormErrors {
    let mut errors = FormErrors::new();

    errors.check(Field::CourseId, validate_course_id(&form.course_id));
    errors.check(Field::Title, validate_course_title(&form.title));
    errors.check(Field::Description, validate_description(&form.description));
    errors.check(
        Field::Prerequisites,
        validate_prerequisites(&form.course_id, &form.prerequisites),
    );

    errors
}

/// Validates every field of the offering form
pub fn validate_instance_form(form: &InstanceForm) -> FormErrors {
    let mut errors = FormErrors::new();

    errors.check(Field::CourseId, validate_course_selection(&form.course_id));
    errors.check(Field::Year, validate_year(&form.year));
    errors.check(Field::Semester, validate_semester(&form.semester));

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn course_form(course_id: &str, prerequisites: &[&str]) -> CourseForm {
        CourseForm {
            course_id: course_id.to_string(),
            title: "Introduction to Programming".to_string(),
            description: "Variables, control flow and functions.".to_string(),
            prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_course_ids() {
        for id in ["CS 101", "CS101", "cs 101", "MATH1001", "ABCD 1234", "EE 200"] {
            assert_eq!(validate_course_id(id), None, "{id} should be valid");
        }
    }

    #[test]
    fn test_invalid_course_ids() {
        assert_eq!(
            validate_course_id("   ").as_deref(),
            Some("Course ID is required")
        );
        assert_eq!(
            validate_course_id("C").as_deref(),
            Some("Course ID must be at least 2 characters")
        );
        assert_eq!(
            validate_course_id("COMPUTERSCIENCE 10101").as_deref(),
            Some("Course ID must be no more than 20 characters")
        );

        for id in ["C 101", "ABCDE 101", "CS 10", "CS 10101", "CS  101", "101 CS", "CS-101"] {
            assert_eq!(
                validate_course_id(id).as_deref(),
                Some(INVALID_COURSE_ID),
                "{id} should be rejected"
            );
        }
    }

    #[test]
    fn test_title_and_description_lengths() {
        assert_eq!(validate_course_title("Intro"), None);
        assert_eq!(validate_course_title("Intr").as_deref(), Some(TITLE_TOO_SHORT));
        assert!(validate_course_title(&"x".repeat(101)).is_some());
        assert_eq!(validate_course_title(&"x".repeat(100)), None);

        assert_eq!(
            validate_description("").as_deref(),
            Some("Description is required")
        );
        assert_eq!(
            validate_description("Too short").as_deref(),
            Some(DESCRIPTION_TOO_SHORT)
        );
        assert_eq!(validate_description("Long enough"), None);
        assert!(validate_description(&"x".repeat(1001)).is_some());
    }

    #[test]
    fn test_year_and_semester() {
        assert_eq!(validate_year("2020"), None);
        assert_eq!(validate_year(" 2030 "), None);
        assert_eq!(
            validate_year("2019").as_deref(),
            Some("Year must be between 2020 and 2030")
        );
        assert_eq!(
            validate_year("next year").as_deref(),
            Some("Year must be a valid number")
        );

        assert_eq!(validate_semester("1"), None);
        assert_eq!(validate_semester("2"), None);
        assert_eq!(
            validate_semester("3").as_deref(),
            Some("Semester must be between 1 and 2")
        );
        assert_eq!(
            validate_semester("").as_deref(),
            Some("Semester must be a valid number")
        );
    }

    #[test]
    fn test_prerequisites() {
        assert_eq!(validate_prerequisites("CS 201", &["CS 101", "MATH 101"]), None);
        assert_eq!(
            validate_prerequisites("CS 201", &["cs  201"]).as_deref(),
            Some(SELF_PREREQUISITE)
        );
        assert_eq!(
            validate_prerequisites("CS 201", &["CS 101", "cs 101"]).as_deref(),
            Some("Prerequisite CS 101 is listed more than once")
        );
    }

    #[test]
    fn test_course_form_uses_field_messages() {
        let form = CourseForm {
            course_id: "C".to_string(),
            title: "Abc".to_string(),
            description: String::new(),
            prerequisites: vec![],
        };
        let errors = validate_course_form(&form);

        assert!(!errors.is_valid());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::CourseId), validate_course_id("C").as_deref());
        assert_eq!(errors.get(Field::Title), Some(TITLE_TOO_SHORT));
        assert_eq!(errors.get(Field::Description), Some("Description is required"));
    }

    #[test]
    fn test_course_form_into_new_course() {
        let new = course_form("cs   201", &["cs 101"]).into_new_course().unwrap();
        assert_eq!(new.course_id, "CS 201");
        assert_eq!(new.prerequisites, vec![CourseId::from("CS 101")]);

        let errors = course_form("cs 201", &["CS 201"]).into_new_course().unwrap_err();
        assert_eq!(errors.get(Field::Prerequisites), Some(SELF_PREREQUISITE));
    }

    #[test]
    fn test_instance_form_missing_course() {
        let errors = validate_instance_form(&InstanceForm::new("", 2024, 1));

        assert!(!errors.is_valid());
        assert_eq!(errors.get(Field::CourseId), Some(COURSE_NOT_SELECTED));
        assert!(!errors.contains(Field::Year));
        assert!(!errors.contains(Field::Semester));
    }

    #[test]
    fn test_instance_form_into_new_instance() {
        let new = InstanceForm::new(" CS101 ", 2024, 2).into_new_instance().unwrap();
        assert_eq!(new.course_id, "CS101");
        assert_eq!(new.year, Year(2024));
        assert_eq!(new.semester, Semester::Second);

        let errors = InstanceForm::new("CS101", 2031, 3)
            .into_new_instance()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_form_errors_serialize_by_field_name() {
        let errors = FormErrors::single(Field::CourseId, COURSE_NOT_SELECTED);
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(json, serde_json::json!({ "courseId": COURSE_NOT_SELECTED }));
        assert_eq!(Field::CourseId.to_string(), "courseId");
        assert_eq!(errors.to_string(), COURSE_NOT_SELECTED);
    }
}
