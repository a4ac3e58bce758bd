use super::Operation;

/// Creates storage for every registered model and join table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSchema {
    /// Drop existing data first
    pub force: bool,

    /// Adjust existing storage to the registered attributes
    pub alter: bool,
}

impl From<SyncSchema> for Operation {
    fn from(value: SyncSchema) -> Self {
        Self::SyncSchema(value)
    }
}
