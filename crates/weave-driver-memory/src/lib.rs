mod error;
use error::MemoryError;

mod table;
use table::{matches, not_found, Table};

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use weave_core::{
    async_trait,
    driver::{
        operation::{
            CreateRelated, Insert, Operation, SetAssociation, SyncSchema, Transaction, Update,
        },
        Driver, Response,
    },
    schema::{Association, Model, Relation, Through},
    Error, Registry, Result, Row, Value,
};

/// A driver keeping every table in process memory.
///
/// Clones share the same tables, so a test can keep a handle for inspection
/// after giving the driver to the builder.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    connected: bool,

    /// Tables required by the registered schema, created on sync
    schema: Vec<String>,

    tables: IndexMap<String, Table>,

    /// Tables as they were when the open transaction started
    snapshot: Option<IndexMap<String, Table>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.state().connected
    }

    /// Names of the tables created so far.
    pub fn tables(&self) -> Vec<String> {
        self.state().tables.keys().cloned().collect()
    }

    /// A copy of every row stored in `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state()
            .tables
            .get(table)
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Driver for Memory {
    async fn register_schema(&mut self, registry: &Registry) -> Result<()> {
        let mut schema = Vec::<String>::new();

        for model in registry.models() {
            schema.push(model.table_name.clone());

            // Join tables without a model of their own
            for through in model.associations.values().filter_map(|edge| edge.through.as_ref()) {
                if through.model.is_none() && !schema.contains(&through.table) {
                    schema.push(through.table.clone());
                }
            }
        }

        tracing::debug!(tables = ?schema, "registered schema");
        self.state().schema = schema;
        Ok(())
    }

    async fn connect(&self, options: &Value) -> Result<()> {
        tracing::debug!(%options, "connect");
        self.state().connected = true;
        Ok(())
    }

    async fn exec(&self, registry: &Arc<Registry>, op: Operation) -> Result<Response> {
        let mut state = self.state();

        if !state.connected {
            weave_core::bail!("the in-memory driver is not connected");
        }

        match op {
            Operation::Insert(op) => state.exec_insert(registry, op),
            Operation::Update(op) => state.exec_update(registry, op),
            Operation::CreateRelated(op) => state.exec_create_related(registry, op),
            Operation::SetAssociation(op) => state.exec_set_association(registry, op),
            Operation::SyncSchema(op) => state.exec_sync(registry, op),
            Operation::Transaction(op) => state.exec_transaction(op),
        }
    }
}

impl State {
    fn exec_insert(&mut self, registry: &Registry, op: Insert) -> Result<Response> {
        let model = registry.model(op.model);
        let record = self.insert(model, &op.values)?;
        Ok(Response::record(record))
    }

    fn exec_update(&mut self, registry: &Registry, op: Update) -> Result<Response> {
        let model = registry.model(op.model);
        let record = self
            .table_mut(&model.table_name)?
            .update(model, &op.key, &op.values)?;
        Ok(Response::record(record))
    }

    fn exec_create_related(&mut self, registry: &Registry, op: CreateRelated) -> Result<Response> {
        let parent = registry.model(op.model);
        let edge = association(parent, &op.association)?;
        let target = registry.model(edge.target);

        let parent_key = self.existing_key(parent, &op.key)?;

        let record = match edge.relation {
            Relation::HasMany | Relation::HasOne => {
                let mut values = op.values;
                values.insert(edge.foreign_key.clone(), parent_key);
                self.insert(target, &values)?
            }
            Relation::BelongsTo => {
                let record = self.insert(target, &op.values)?;
                let values = Row::from([(edge.foreign_key.clone(), key_value(target, &record))]);
                self.table_mut(&parent.table_name)?
                    .update(parent, &op.key, &values)?;
                record
            }
            Relation::BelongsToMany => {
                let record = self.insert(target, &op.values)?;
                let through = through(edge)?;
                self.link_through(
                    registry,
                    through,
                    parent_key,
                    key_value(target, &record),
                    op.through,
                )?;
                record
            }
        };

        Ok(Response::record(record))
    }

    fn exec_set_association(
        &mut self,
        registry: &Registry,
        op: SetAssociation,
    ) -> Result<Response> {
        let parent = registry.model(op.model);
        let edge = association(parent, &op.association)?;
        let target = registry.model(edge.target);

        let parent_key = self.existing_key(parent, &op.key)?;
        let count = op.targets.len();

        // Every target must be stored before anything is relinked
        let target_keys = op
            .targets
            .iter()
            .map(|link| self.existing_key(target, &link.key))
            .collect::<Result<Vec<_>>>()?;

        if !edge.is_many() && count > 1 {
            return Err(Error::driver_operation_failed(MemoryError::TooManyTargets {
                association: format!("{}.{}", parent.name, edge.name),
                count,
            }));
        }

        match edge.relation {
            Relation::HasMany | Relation::HasOne => {
                let table = self.table_mut(&target.table_name)?;

                for row in &mut table.rows {
                    if op.targets.iter().any(|link| matches(row, &link.key)) {
                        row.insert(edge.foreign_key.clone(), parent_key.clone());
                    } else if row.get(&edge.foreign_key) == Some(&parent_key) {
                        row.insert(edge.foreign_key.clone(), Value::Null);
                    }
                }
            }
            Relation::BelongsTo => {
                let value = target_keys.first().cloned().unwrap_or_default();
                let values = Row::from([(edge.foreign_key.clone(), value)]);
                self.table_mut(&parent.table_name)?
                    .update(parent, &op.key, &values)?;
            }
            Relation::BelongsToMany => {
                let through = through(edge)?;

                let table = self.table_mut(&through.table)?;
                let (previous, others): (Vec<Row>, Vec<Row>) = std::mem::take(&mut table.rows)
                    .into_iter()
                    .partition(|row| row.get(&through.source_key) == Some(&parent_key));
                table.rows = others;

                for (link, target_key) in op.targets.into_iter().zip(target_keys) {
                    let kept = previous
                        .iter()
                        .find(|row| row.get(&through.target_key) == Some(&target_key));

                    match (link.through, kept) {
                        // Unchanged links keep their payload
                        (None, Some(row)) => {
                            let row = row.clone();
                            self.table_mut(&through.table)?.rows.push(row);
                        }
                        (payload, _) => {
                            self.link_through(
                                registry,
                                through,
                                parent_key.clone(),
                                target_key,
                                payload,
                            )?;
                        }
                    }
                }
            }
        }

        Ok(Response::count(count as u64))
    }

    fn exec_sync(&mut self, registry: &Registry, op: SyncSchema) -> Result<Response> {
        for name in &self.schema {
            let table = self.tables.entry(name.clone()).or_default();
            if op.force {
                table.clear();
            }
        }

        if op.alter {
            for model in registry.models() {
                let Some(table) = self.tables.get_mut(&model.table_name) else {
                    continue;
                };

                for row in &mut table.rows {
                    for name in model.attributes.keys() {
                        row.entry(name.clone()).or_insert(Value::Null);
                    }
                }
            }
        }

        tracing::debug!(force = op.force, alter = op.alter, "synced schema");
        Ok(Response::count(self.schema.len() as u64))
    }

    fn exec_transaction(&mut self, op: Transaction) -> Result<Response> {
        match op {
            Transaction::Start => {
                if self.snapshot.is_some() {
                    weave_core::bail!("a transaction is already open");
                }
                self.snapshot = Some(self.tables.clone());
            }
            Transaction::Commit => {
                self.snapshot = None;
            }
            Transaction::Rollback => {
                if let Some(tables) = self.snapshot.take() {
                    self.tables = tables;
                }
            }
        }

        Ok(Response::count(0))
    }

    fn insert(&mut self, model: &Model, values: &Row) -> Result<Row> {
        self.table_mut(&model.table_name)?.insert(model, values)
    }

    /// Adds a join row linking `source` to `target`.
    fn link_through(
        &mut self,
        registry: &Registry,
        through: &Through,
        source: Value,
        target: Value,
        payload: Option<Row>,
    ) -> Result<()> {
        let mut row = payload.unwrap_or_default();
        row.insert(through.source_key.clone(), source);
        row.insert(through.target_key.clone(), target);

        match through.model {
            Some(model) => {
                self.insert(registry.model(model), &row)?;
            }
            None => self.table_mut(&through.table)?.rows.push(row),
        }

        Ok(())
    }

    /// Key value of the stored record identified by `key`.
    fn existing_key(&self, model: &Model, key: &Row) -> Result<Value> {
        let table = self
            .tables
            .get(&model.table_name)
            .ok_or_else(|| missing_table(&model.table_name))?;

        match table.get(key) {
            Some(row) => Ok(key_value(model, row)),
            None => Err(not_found(&model.table_name, key)),
        }
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| missing_table(name))
    }
}

fn association<'a>(model: &'a Model, name: &str) -> Result<&'a Association> {
    model.association(name).ok_or_else(|| {
        weave_core::err!("model `{}` has no association `{name}`", model.name)
    })
}

fn through(edge: &Association) -> Result<&Through> {
    edge.through.as_ref().ok_or_else(|| {
        weave_core::err!("association `{}` has no through table", edge.name)
    })
}

/// The single primary-key value of a row.
fn key_value(model: &Model, row: &Row) -> Value {
    model
        .primary_key()
        .next()
        .and_then(|name| row.get(name))
        .cloned()
        .unwrap_or_default()
}

fn missing_table(name: &str) -> Error {
    Error::driver_operation_failed(MemoryError::MissingTable(name.to_string()))
}
