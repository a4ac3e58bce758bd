use crate::{Result, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// The record written by the operation
    Record(Row),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn record(row: Row) -> Self {
        Self {
            rows: Rows::Record(row),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Rows::Count(count) => Ok(count),
            Rows::Record(_) => crate::bail!("expected a row count, the driver returned a record"),
        }
    }

    pub fn into_record(self) -> Result<Row> {
        match self {
            Rows::Record(row) => Ok(row),
            Rows::Count(count) => {
                crate::bail!("expected a record, the driver returned a count of {count}")
            }
        }
    }
}
