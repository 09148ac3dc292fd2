//! Academic-term durations used by project and group memberships.
//!
//! A point in time is a year plus a semester (`0` for the first half, `1` for
//! the second). A duration runs from `since` to an optional `until`; an absent
//! `until` means the duration is still ongoing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for semesters and durations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationValidationError {
    /// Semester code outside `{0, 1}`.
    #[error("semester must be 0 or 1, got {value}")]
    InvalidSemester { value: i64 },
    /// `until` precedes `since`.
    #[error("duration end {until} precedes start {since}")]
    EndBeforeStart {
        since: YearWithSemester,
        until: YearWithSemester,
    },
}

/// Half-year term within an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Semester(u8);

impl Semester {
    /// First half of the year.
    pub const FIRST: Self = Self(0);
    /// Second half of the year.
    pub const SECOND: Self = Self(1);

    /// Numeric code stored in the database.
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Validate a raw semester code.
    pub fn new(value: i64) -> Result<Self, DurationValidationError> {
        match value {
            0 => Ok(Self::FIRST),
            1 => Ok(Self::SECOND),
            other => Err(DurationValidationError::InvalidSemester { value: other }),
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = DurationValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Semester> for u8 {
    fn from(value: Semester) -> Self {
        value.0
    }
}

/// A year paired with a semester. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearWithSemester {
    pub year: i32,
    pub semester: Semester,
}

impl YearWithSemester {
    pub const fn new(year: i32, semester: Semester) -> Self {
        Self { year, semester }
    }

    /// Build from the raw column pair used by persistence rows.
    pub fn from_parts(year: i32, semester: i16) -> Result<Self, DurationValidationError> {
        Ok(Self::new(year, Semester::new(i64::from(semester))?))
    }
}

impl std::fmt::Display for YearWithSemester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-S{}", self.year, self.semester.code())
    }
}

/// A validated span of terms with an optional end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DurationDto", into = "DurationDto")]
pub struct YearWithSemesterDuration {
    since: YearWithSemester,
    until: Option<YearWithSemester>,
}

impl YearWithSemesterDuration {
    /// Validate that `until`, when present, does not precede `since`.
    pub fn new(
        since: YearWithSemester,
        until: Option<YearWithSemester>,
    ) -> Result<Self, DurationValidationError> {
        match until {
            Some(end) if end < since => {
                Err(DurationValidationError::EndBeforeStart { since, until: end })
            }
            _ => Ok(Self { since, until }),
        }
    }

    pub const fn since(&self) -> YearWithSemester {
        self.since
    }

    pub const fn until(&self) -> Option<YearWithSemester> {
        self.until
    }

    /// Return whether `inner` lies entirely within this duration.
    ///
    /// An open-ended `inner` only fits inside an open-ended outer duration.
    pub fn contains(&self, inner: &Self) -> bool {
        if inner.since < self.since {
            return false;
        }
        match (self.until, inner.until) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer_end), Some(inner_end)) => inner_end <= outer_end,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DurationDto {
    since: YearWithSemester,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    until: Option<YearWithSemester>,
}

impl From<YearWithSemesterDuration> for DurationDto {
    fn from(value: YearWithSemesterDuration) -> Self {
        Self {
            since: value.since,
            until: value.until,
        }
    }
}

impl TryFrom<DurationDto> for YearWithSemesterDuration {
    type Error = DurationValidationError;

    fn try_from(value: DurationDto) -> Result<Self, Self::Error> {
        Self::new(value.since, value.until)
    }
}
