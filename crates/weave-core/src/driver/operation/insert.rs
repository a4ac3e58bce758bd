use super::Operation;
use crate::{schema::ModelId, Row};

/// Inserts a record. Responds with the stored record, auto-populated
/// attributes included.
#[derive(Debug, Clone)]
pub struct Insert {
    pub model: ModelId,
    pub values: Row,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
