//! Student records: `id first_name last_name email phone department_id`

use serde::Serialize;

use super::instructor::full_name;
use super::validation;
use crate::persistence::{DecodeError, Fields, LineRecord};
use crate::store::{EntityKind, ForeignKey, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department_id: RecordId,
}

impl LineRecord for Student {
    fn encode(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.id, self.first_name, self.last_name, self.email, self.phone, self.department_id
        )
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let student = Student {
            id: fields.parse("id")?,
            first_name: fields.text("first_name")?.to_string(),
            last_name: fields.text("last_name")?.to_string(),
            email: fields.text("email")?.to_string(),
            phone: fields.text("phone")?.to_string(),
            department_id: fields.parse("department_id")?,
        };
        fields.finish()?;
        Ok(student)
    }
}

impl Record for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> RecordId {
        self.id
    }

    fn secondary_key(&self) -> Option<String> {
        Some(full_name(&self.first_name, &self.last_name))
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new(EntityKind::Department, self.department_id)]
    }

    fn validate(&self) -> Result<(), String> {
        validation::text("first_name", &self.first_name, validation::NAME_MAX)?;
        validation::text("last_name", &self.last_name, validation::NAME_MAX)?;
        validation::email("email", &self.email)?;
        validation::phone("phone", &self.phone)
    }
}
