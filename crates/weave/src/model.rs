use crate::{Db, Input, Instance, Persistable, Result};

use weave_core::{
    schema::{Model, ModelId},
    Value,
};

/// Model-level entry point, obtained from [`Db::model`].
#[derive(Debug, Clone)]
pub struct ModelHandle {
    db: Db,
    id: ModelId,
}

impl ModelHandle {
    pub(crate) fn new(db: Db, id: ModelId) -> Self {
        Self { db, id }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn schema(&self) -> &Model {
        self.db.registry().model(self.id)
    }

    pub fn name(&self) -> &str {
        &self.schema().name
    }

    /// An empty, unsaved instance. Its deep path is the model name.
    pub fn new_instance(&self) -> Instance {
        Instance::new(self.db.clone(), self.id, self.name().to_string())
    }

    /// A new instance filled with `values`.
    pub async fn build(&self, values: impl Into<Input>) -> Result<Instance> {
        let mut instance = self.new_instance();
        instance.fill(values.into()).await?;
        Ok(instance)
    }

    /// A new instance filled with `values` and deep-saved.
    pub async fn create(&self, values: impl Into<Input>) -> Result<Instance> {
        let mut instance = self.new_instance();
        instance.fill_and_save(values.into()).await?;
        Ok(instance)
    }

    /// Invokes a static method extension.
    pub fn call_static(&self, name: &str, args: &[Value]) -> Result<Value> {
        let model = self.schema();
        let Some(method) = model.statics.get(name) else {
            weave_core::bail!("model `{}` has no static method `{name}`", model.name);
        };
        method.call(args)
    }
}
