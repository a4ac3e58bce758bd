use super::Operation;
use crate::{schema::ModelId, Row};

/// Links a parent record to exactly the given, already persisted, targets.
///
/// Responds with the number of linked targets.
#[derive(Debug, Clone)]
pub struct SetAssociation {
    pub model: ModelId,

    /// Primary key of the parent record
    pub key: Row,

    /// Accessor name of the association on `model`
    pub association: String,

    pub targets: Vec<LinkTarget>,
}

/// One record to link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    /// Primary key of the target record
    pub key: Row,

    /// Extra columns for the through row of a many-to-many association
    pub through: Option<Row>,
}

impl From<SetAssociation> for Operation {
    fn from(value: SetAssociation) -> Self {
        Self::SetAssociation(value)
    }
}
