mod fill;

mod input;
pub use input::Input;

mod related;
pub use related::Related;

mod save;

use crate::{Db, Persistable, Result};

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use weave_core::{
    schema::{Model, ModelId},
    Error, Row, Value,
};

/// A live record of one registered model.
pub struct Instance {
    db: Db,

    model: ModelId,

    /// Attribute values
    values: Row,

    /// Pass-through values for keys that are not attributes, such as
    /// through-table payloads
    extras: Row,

    /// Attributes written since the instance was last loaded from storage
    changed: IndexSet<String>,

    /// True once the instance was inserted or loaded from storage
    persisted: bool,

    is_new_record: Option<bool>,

    /// Nested instances collected by `fill`, consumed by `deep_save`
    pending: Vec<(String, Related)>,

    /// Persisted associated instances, by accessor
    loaded: IndexMap<String, Related>,

    /// Position in the hydrated graph, e.g. `Order.items[2].tags[0]`
    deep_path: String,
}

/// The parent an instance is being deep-saved for.
#[derive(Debug, Clone, Copy)]
pub struct EdgeContext<'a> {
    /// Accessor of the association on the parent's model
    pub association: &'a str,

    pub parent: &'a Instance,
}

impl Instance {
    pub(crate) fn new(db: Db, model: ModelId, deep_path: String) -> Self {
        let mut instance = Self {
            db,
            model,
            values: Row::new(),
            extras: Row::new(),
            changed: IndexSet::new(),
            persisted: false,
            is_new_record: None,
            pending: vec![],
            loaded: IndexMap::new(),
            deep_path,
        };
        instance.refresh_new_record();
        instance
    }

    /// An instance for a row read back from storage.
    pub(crate) fn from_row(db: Db, model: ModelId, row: Row, deep_path: String) -> Self {
        let mut instance = Self::new(db, model, deep_path);
        instance.load_row(row);
        instance
    }

    pub fn model(&self) -> &Model {
        self.db.registry().model(self.model)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Attribute value, falling back to pass-through values.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).or_else(|| self.extras.get(name))
    }

    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn extras(&self) -> &Row {
        &self.extras
    }

    /// Primary-key values
    pub fn key(&self) -> Row {
        self.model().key_of(&self.values)
    }

    pub fn deep_path(&self) -> &str {
        &self.deep_path
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Attributes written since the instance was last persisted
    pub fn changed(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(String::as_str)
    }

    /// Associations collected by `fill` and not yet saved
    pub fn pending(&self) -> &[(String, Related)] {
        &self.pending
    }

    /// Persisted instances of an association, populated by `deep_save`.
    pub fn related(&self, association: &str) -> Option<&Related> {
        self.loaded.get(association)
    }

    /// The attribute-write primitive: transforms and validates `value`, then
    /// stores it. Unlike `fill`, this overwrites primary keys.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let model = self.model();
        let Some(attribute) = model.attribute(name) else {
            return Err(Error::unknown_attribute(&model.name, name));
        };

        let value = attribute.write(name, value.into())?;
        self.write_attribute(name.to_string(), value);
        self.refresh_new_record();
        Ok(())
    }

    /// Invokes an instance method extension.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let model = self.model();
        let Some(method) = model.methods.get(name) else {
            weave_core::bail!("model `{}` has no method `{name}`", model.name);
        };
        method.call(&self.values, args)
    }

    fn write_attribute(&mut self, name: String, value: Value) {
        if self.values.get(&name) != Some(&value) {
            self.values.insert(name.clone(), value);
            self.changed.insert(name);
        }
    }

    fn load_row(&mut self, row: Row) {
        self.values = row;
        self.changed.clear();
        self.persisted = true;
        self.refresh_new_record();
    }

    fn refresh_new_record(&mut self) {
        self.is_new_record = self.db.registry().model(self.model).is_new_record(&self.values);
    }
}

#[async_trait]
impl Persistable for Instance {
    async fn fill(&mut self, values: Input) -> Result<()> {
        self.fill_values(values).await
    }

    async fn deep_save(&mut self, context: Option<EdgeContext<'_>>) -> Result<()> {
        let path = self.deep_path.clone();

        self.deep_save_impl(context)
            .await
            .map_err(|err| err.context(Error::deep_path(path)))
    }

    fn is_new_record(&self) -> Option<bool> {
        self.is_new_record
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.model().name)
            .field("deep_path", &self.deep_path)
            .field("values", &self.values)
            .field("extras", &self.extras)
            .field("is_new_record", &self.is_new_record)
            .field("pending", &self.pending)
            .field("loaded", &self.loaded)
            .finish()
    }
}
