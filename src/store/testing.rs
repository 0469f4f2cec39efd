//! Minimal record type for store unit tests

use super::record::{EntityKind, ForeignKey, Record, RecordId};
use crate::persistence::{DecodeError, Fields, LineRecord};

/// `id name owner`, where owner is an instructor id or `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: RecordId,
    pub name: String,
    pub owner: Option<RecordId>,
}

impl Item {
    pub fn new(id: RecordId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: RecordId) -> Self {
        self.owner = Some(owner);
        self
    }
}

impl LineRecord for Item {
    fn encode(&self) -> String {
        match self.owner {
            Some(owner) => format!("{} {} {}", self.id, self.name, owner),
            None => format!("{} {} -", self.id, self.name),
        }
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(line);
        let id = fields.parse("id")?;
        let name = fields.text("name")?.to_string();
        let owner = match fields.text("owner")? {
            "-" => None,
            raw => Some(
                raw.parse()
                    .map_err(|_| DecodeError(format!("bad owner '{}'", raw)))?,
            ),
        };
        fields.finish()?;
        Ok(Item { id, name, owner })
    }
}

impl Record for Item {
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> RecordId {
        self.id
    }

    fn secondary_key(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn foreign_keys(&self) -> Vec<ForeignKey> {
        self.owner
            .map(|owner| ForeignKey::new(EntityKind::Instructor, owner))
            .into_iter()
            .collect()
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 8 {
            return Err(format!("name '{}' must be 1-8 characters", self.name));
        }
        Ok(())
    }
}
