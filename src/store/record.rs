//! Record abstraction shared by every entity kind

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::persistence::LineRecord;

/// Numeric primary key.
pub type RecordId = u32;

/// The kinds of record the catalog stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Department,
    Instructor,
    Student,
    Course,
    Enrollment,
    Phone,
}

impl EntityKind {
    /// Every kind, owners before dependents.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Department,
        EntityKind::Instructor,
        EntityKind::Student,
        EntityKind::Course,
        EntityKind::Enrollment,
        EntityKind::Phone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Department => "department",
            EntityKind::Instructor => "instructor",
            EntityKind::Student => "student",
            EntityKind::Course => "course",
            EntityKind::Enrollment => "enrollment",
            EntityKind::Phone => "phone",
        }
    }

    /// File name under the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            EntityKind::Department => "Departments.txt",
            EntityKind::Instructor => "Instructors.txt",
            EntityKind::Student => "Students.txt",
            EntityKind::Course => "Courses.txt",
            EntityKind::Enrollment => "Enrollments.txt",
            EntityKind::Phone => "instructor_phones.txt",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown entity kind '{}'", s))
    }
}

/// A reference from one record to another store's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub kind: EntityKind,
    pub id: RecordId,
}

impl ForeignKey {
    pub fn new(kind: EntityKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// What a `RecordStore` needs to know about the records it holds.
pub trait Record: LineRecord + Clone + Send + Sync {
    /// Kind stored in this table
    const KIND: EntityKind;

    /// Primary key
    fn id(&self) -> RecordId;

    /// Text key for the bounded secondary index, if this kind has one
    fn secondary_key(&self) -> Option<String> {
        None
    }

    /// Keys this record holds into other stores
    fn foreign_keys(&self) -> Vec<ForeignKey> {
        Vec::new()
    }

    /// Fields whose values must be unique across live records of this kind.
    ///
    /// Checked on live inserts and updates only.
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Field checks run on live inserts and updates, never on load
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Whether this record references `target`
    fn references(&self, target: ForeignKey) -> bool {
        self.foreign_keys().contains(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_name() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!("Course".parse::<EntityKind>().unwrap(), EntityKind::Course);
        assert!("campus".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(EntityKind::Department.file_name(), "Departments.txt");
        assert_eq!(EntityKind::Phone.file_name(), "instructor_phones.txt");
    }
}
