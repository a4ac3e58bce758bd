use super::Operation;
use crate::{schema::ModelId, Row};

/// Updates the record identified by `key`. Responds with the stored record.
#[derive(Debug, Clone)]
pub struct Update {
    pub model: ModelId,
    pub key: Row,
    pub values: Row,
}

impl From<Update> for Operation {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
