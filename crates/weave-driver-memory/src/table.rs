use crate::error::MemoryError;

use weave_core::{
    schema::{AutoStrategy, Model},
    value::is_missing,
    Error, Result, Row, Value,
};

/// Rows of one table, in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    pub(crate) rows: Vec<Row>,

    /// Last value handed out by an auto-increment column
    last_id: u64,
}

impl Table {
    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.last_id = 0;
    }

    /// Inserts a record of `model`, populating auto attributes and defaults,
    /// and returns the stored row.
    pub(crate) fn insert(&mut self, model: &Model, values: &Row) -> Result<Row> {
        let mut row = Row::new();

        for (name, attribute) in &model.attributes {
            let value = match values.get(name) {
                value if !is_missing(value) => value.cloned().unwrap_or_default(),
                _ => match attribute.auto {
                    Some(AutoStrategy::Increment) => {
                        self.last_id += 1;
                        Value::from(self.last_id)
                    }
                    Some(AutoStrategy::Uuid) => Value::from(uuid::Uuid::new_v4().to_string()),
                    None => attribute.default.clone().unwrap_or_default(),
                },
            };

            // Keep the sequence ahead of explicitly provided keys
            if attribute.auto == Some(AutoStrategy::Increment) {
                if let Some(id) = value.as_u64() {
                    self.last_id = self.last_id.max(id);
                }
            }

            row.insert(name.clone(), value);
        }

        self.check(model, &row, None)?;
        self.rows.push(row.clone());
        Ok(row)
    }

    /// Applies `values` to the row identified by `key` and returns it.
    pub(crate) fn update(&mut self, model: &Model, key: &Row, values: &Row) -> Result<Row> {
        let Some(index) = self.position(key) else {
            return Err(not_found(&model.table_name, key));
        };

        let mut row = self.rows[index].clone();
        for (name, value) in values {
            if model.attributes.contains_key(name) {
                row.insert(name.clone(), value.clone());
            }
        }

        self.check(model, &row, Some(index))?;
        self.rows[index] = row.clone();
        Ok(row)
    }

    pub(crate) fn position(&self, key: &Row) -> Option<usize> {
        self.rows.iter().position(|row| matches(row, key))
    }

    pub(crate) fn get(&self, key: &Row) -> Option<&Row> {
        self.rows.iter().find(|row| matches(row, key))
    }

    /// Nullability and uniqueness constraints, ignoring the row at `skip`.
    fn check(&self, model: &Model, row: &Row, skip: Option<usize>) -> Result<()> {
        for (name, attribute) in &model.attributes {
            let value = row.get(name).unwrap_or(&Value::Null);

            if value.is_null() {
                if !attribute.allow_null {
                    return Err(Error::driver_operation_failed(MemoryError::NotNull {
                        table: model.table_name.clone(),
                        column: name.clone(),
                    }));
                }
                continue;
            }

            if !(attribute.unique || attribute.primary_key) {
                continue;
            }

            let taken = self
                .rows
                .iter()
                .enumerate()
                .any(|(index, other)| Some(index) != skip && other.get(name) == Some(value));

            if taken {
                return Err(Error::driver_operation_failed(MemoryError::Unique {
                    table: model.table_name.clone(),
                    column: name.clone(),
                    value: value.to_string(),
                }));
            }
        }

        Ok(())
    }
}

/// Returns `true` when `row` holds every column of `key`.
pub(crate) fn matches(row: &Row, key: &Row) -> bool {
    key.iter().all(|(name, value)| row.get(name) == Some(value))
}

pub(crate) fn not_found(table: &str, key: &Row) -> Error {
    let key = key
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    Error::record_not_found(format!("table={table} key={{{key}}}"))
}
