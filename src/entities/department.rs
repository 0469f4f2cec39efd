//! Department records: `id name phone`

use serde::Serialize;

use super::validation;
use crate::persistence::{DecodeError, Fields, LineRecord};
use crate::store::{EntityKind, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
}

impl Department {
    pub fn new(id: RecordId, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
        }
    }
}

impl LineRecord for Department {
    fn encode(&self) -> String {
        format!("{} {} {}", self.id, self.name, self.phone)
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let department = Department {
            id: fields.parse("id")?,
            name: fields.text("name")?.to_string(),
            phone: fields.text("phone")?.to_string(),
        };
        fields.finish()?;
        Ok(department)
    }
}

impl Record for Department {
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> RecordId {
        self.id
    }

    fn secondary_key(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn validate(&self) -> Result<(), String> {
        validation::text("name", &self.name, validation::TITLE_MAX)?;
        validation::phone("phone", &self.phone)
    }
}
