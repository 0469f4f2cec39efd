//! Instructor records: `id first_name last_name email department_id`
//!
//! The secondary key is the full name, first and last joined by one space.

use serde::Serialize;

use super::validation;
use crate::persistence::{DecodeError, Fields, LineRecord};
use crate::store::{EntityKind, ForeignKey, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instructor {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: RecordId,
}

impl Instructor {
    pub fn new(
        id: RecordId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        department_id: RecordId,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            department_id,
        }
    }
}

/// Secondary index key for a person's name.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

impl LineRecord for Instructor {
    fn encode(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.id, self.first_name, self.last_name, self.email, self.department_id
        )
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let instructor = Instructor {
            id: fields.parse("id")?,
            first_name: fields.text("first_name")?.to_string(),
            last_name: fields.text("last_name")?.to_string(),
            email: fields.text("email")?.to_string(),
            department_id: fields.parse("department_id")?,
        };
        fields.finish()?;
        Ok(instructor)
    }
}

impl Record for Instructor {
    const KIND: EntityKind = EntityKind::Instructor;

    fn id(&self) -> RecordId {
        self.id
    }

    fn secondary_key(&self) -> Option<String> {
        Some(full_name(&self.first_name, &self.last_name))
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new(EntityKind::Department, self.department_id)]
    }

    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }

    fn validate(&self) -> Result<(), String> {
        validation::text("first_name", &self.first_name, validation::NAME_MAX)?;
        validation::text("last_name", &self.last_name, validation::NAME_MAX)?;
        validation::email("email", &self.email)
    }
}
