use super::Operation;
use crate::{schema::ModelId, Row};

/// Creates a record associated with an already persisted parent.
///
/// Responds with the created record.
#[derive(Debug, Clone)]
pub struct CreateRelated {
    /// Model owning the association
    pub model: ModelId,

    /// Primary key of the parent record
    pub key: Row,

    /// Accessor name of the association on `model`
    pub association: String,

    /// Attribute values of the record to create
    pub values: Row,

    /// Extra columns for the through row of a many-to-many association
    pub through: Option<Row>,
}

impl From<CreateRelated> for Operation {
    fn from(value: CreateRelated) -> Self {
        Self::CreateRelated(value)
    }
}
