use std::fmt;

/// Constraint violations reported by the in-memory store.
#[derive(Debug)]
pub(crate) enum MemoryError {
    MissingTable(String),
    NotNull { table: String, column: String },
    Unique { table: String, column: String, value: String },
    TooManyTargets { association: String, count: usize },
}

impl std::error::Error for MemoryError {}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::MissingTable(table) => {
                write!(f, "table `{table}` does not exist, sync the schema first")
            }
            MemoryError::NotNull { table, column } => {
                write!(f, "`{table}.{column}` cannot be null")
            }
            MemoryError::Unique {
                table,
                column,
                value,
            } => write!(f, "`{table}.{column}` must be unique, {value} already exists"),
            MemoryError::TooManyTargets { association, count } => write!(
                f,
                "`{association}` links a single record, {count} were given"
            ),
        }
    }
}
