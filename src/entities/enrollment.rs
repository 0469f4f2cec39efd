//! Enrollment records: `id student_id course_id grade status`
//!
//! `grade` is a single letter or `-` when not yet graded. `status` is
//! written as its numeric code.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::persistence::{DecodeError, Fields, LineRecord};
use crate::store::{EntityKind, ForeignKey, Record, RecordId};

/// Letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "F" => Ok(Grade::F),
            other => Err(format!("grade must be one of A, B, C, D, F, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Dropped,
    Completed,
}

impl EnrollmentStatus {
    pub fn code(&self) -> u8 {
        match self {
            EnrollmentStatus::Enrolled => 0,
            EnrollmentStatus::Dropped => 1,
            EnrollmentStatus::Completed => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EnrollmentStatus::Enrolled),
            1 => Some(EnrollmentStatus::Dropped),
            2 => Some(EnrollmentStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Dropped => "dropped",
            EnrollmentStatus::Completed => "completed",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    /// Accepts the numeric code or the lowercase name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(status) = s.parse::<u8>().ok().and_then(EnrollmentStatus::from_code) {
            return Ok(status);
        }
        match s.to_ascii_lowercase().as_str() {
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "dropped" => Ok(EnrollmentStatus::Dropped),
            "completed" => Ok(EnrollmentStatus::Completed),
            _ => Err(format!("unknown enrollment status '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub id: RecordId,
    pub student_id: RecordId,
    pub course_id: RecordId,
    pub grade: Option<Grade>,
    pub status: EnrollmentStatus,
}

impl Enrollment {
    /// A fresh, ungraded enrollment.
    pub fn new(id: RecordId, student_id: RecordId, course_id: RecordId) -> Self {
        Self {
            id,
            student_id,
            course_id,
            grade: None,
            status: EnrollmentStatus::Enrolled,
        }
    }
}

impl LineRecord for Enrollment {
    fn encode(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.id,
            self.student_id,
            self.course_id,
            self.grade.map_or("-", |g| g.as_str()),
            self.status.code()
        )
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let id = fields.parse("id")?;
        let student_id = fields.parse("student_id")?;
        let course_id = fields.parse("course_id")?;
        let grade = match fields.text("grade")? {
            "-" => None,
            raw => Some(raw.parse::<Grade>().map_err(DecodeError)?),
        };
        let code: u8 = fields.parse("status")?;
        let status = EnrollmentStatus::from_code(code)
            .ok_or_else(|| DecodeError(format!("unknown status code {}", code)))?;
        fields.finish()?;
        Ok(Enrollment {
            id,
            student_id,
            course_id,
            grade,
            status,
        })
    }
}

impl Record for Enrollment {
    const KIND: EntityKind = EntityKind::Enrollment;

    fn id(&self) -> RecordId {
        self.id
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey::new(EntityKind::Student, self.student_id),
            ForeignKey::new(EntityKind::Course, self.course_id),
        ]
    }
}
