//! Course records: `id title credits department_id instructor_id`

use serde::Serialize;

use super::validation;
use crate::persistence::{DecodeError, Fields, LineRecord};
use crate::store::{EntityKind, ForeignKey, Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: RecordId,
    pub title: String,
    pub credits: u32,
    pub department_id: RecordId,
    pub instructor_id: RecordId,
}

impl LineRecord for Course {
    fn encode(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.id, self.title, self.credits, self.department_id, self.instructor_id
        )
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let course = Course {
            id: fields.parse("id")?,
            title: fields.text("title")?.to_string(),
            credits: fields.parse("credits")?,
            department_id: fields.parse("department_id")?,
            instructor_id: fields.parse("instructor_id")?,
        };
        fields.finish()?;
        Ok(course)
    }
}

impl Record for Course {
    const KIND: EntityKind = EntityKind::Course;

    fn id(&self) -> RecordId {
        self.id
    }

    fn secondary_key(&self) -> Option<String> {
        Some(self.title.clone())
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey::new(EntityKind::Department, self.department_id),
            ForeignKey::new(EntityKind::Instructor, self.instructor_id),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        validation::text("title", &self.title, validation::TITLE_MAX)?;
        if self.credits == 0 {
            return Err("credits must be positive".to_string());
        }
        Ok(())
    }
}
