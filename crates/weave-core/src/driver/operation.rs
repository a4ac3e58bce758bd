mod create_related;
pub use create_related::CreateRelated;

mod insert;
pub use insert::Insert;

mod set_association;
pub use set_association::{LinkTarget, SetAssociation};

mod sync_schema;
pub use sync_schema::SyncSchema;

mod transaction;
pub use transaction::Transaction;

mod update;
pub use update::Update;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Create a related record through a persisted parent's association
    CreateRelated(CreateRelated),

    /// Create a new record
    Insert(Insert),

    /// Replace the records linked to a parent through an association
    SetAssociation(SetAssociation),

    /// Synchronize storage with the registered schema
    SyncSchema(SyncSchema),

    /// Execute a transaction lifecycle op
    Transaction(Transaction),

    /// Update a record by the primary key
    Update(Update),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateRelated(_) => "create_related",
            Operation::Insert(_) => "insert",
            Operation::SetAssociation(_) => "set_association",
            Operation::SyncSchema(_) => "sync_schema",
            Operation::Transaction(_) => "transaction",
            Operation::Update(_) => "update",
        }
    }
}
