//! Instructor phone numbers: `id instructor_id phone`

use serde::Serialize;

use super::validation;
use crate::persistence::{DecodeError, Fields, LineRecord};
use crate::store::{EntityKind, ForeignKey, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneNumber {
    pub id: RecordId,
    pub instructor_id: RecordId,
    pub phone: String,
}

impl LineRecord for PhoneNumber {
    fn encode(&self) -> String {
        format!("{} {} {}", self.id, self.instructor_id, self.phone)
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let phone = PhoneNumber {
            id: fields.parse("id")?,
            instructor_id: fields.parse("instructor_id")?,
            phone: fields.text("phone")?.to_string(),
        };
        fields.finish()?;
        Ok(phone)
    }
}

impl Record for PhoneNumber {
    const KIND: EntityKind = EntityKind::Phone;

    fn id(&self) -> RecordId {
        self.id
    }

    fn secondary_key(&self) -> Option<String> {
        Some(self.phone.clone())
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new(EntityKind::Instructor, self.instructor_id)]
    }

    /// A number belongs to one instructor at most.
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("phone", self.phone.clone())]
    }

    fn validate(&self) -> Result<(), String> {
        validation::phone("phone", &self.phone)
    }
}
