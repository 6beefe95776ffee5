use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::ParseIntError,
    ops::Deref,
    str::FromStr,
};

/// Academic year of an offering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct Year(pub u16);

impl Year {
    /// Earliest year the catalog accepts
    pub const MIN: Year = Year(2020);
    /// Latest year the catalog accepts
    pub const MAX: Year = Year(2030);

    /// All years offered for selection, oldest first
    pub fn available() -> Vec<Year> {
        (Self::MIN.0..=Self::MAX.0).map(Year).collect()
    }

    pub fn current() -> Year {
        Year(Utc::now().year() as u16)
    }

    pub fn in_range(self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self)
    }
}

impl Deref for Year {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Year {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s.trim().parse()?;
        Ok(Year(year))
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a number is not a valid semester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSemester(pub u8);

impl Display for InvalidSemester {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "invalid semester {}, expected 1 or 2", self.0)
    }
}

/// Semester within an academic year, an integer on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    First = 1,
    Second = 2,
}

impl Semester {
    pub fn number(self) -> u8 {
        self as u8
    }

    /// January through June is the first semester, the rest of the year the second
    pub fn current() -> Semester {
        Self::for_month(Utc::now().month())
    }

    fn for_month(month: u32) -> Semester {
        if month <= 6 {
            Semester::First
        } else {
            Semester::Second
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = InvalidSemester;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::First),
            2 => Ok(Semester::Second),
            other => Err(InvalidSemester(other)),
        }
    }
}

impl From<Semester> for u8 {
    fn from(semester: Semester) -> Self {
        semester.number()
    }
}

impl Display for Semester {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Semester {}", self.number())
    }
}

/// A (year, semester) pair used to select which offerings are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub year: Year,
    pub semester: Semester,
}

impl Term {
    pub fn new(year: Year, semester: Semester) -> Self {
        Self { year, semester }
    }

    pub fn current() -> Self {
        Self::new(Year::current(), Semester::current())
    }

    pub fn is_current(&self) -> bool {
        *self == Self::current()
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.year, self.semester)
    }
}
