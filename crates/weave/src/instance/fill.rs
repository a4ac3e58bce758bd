use super::{Input, Instance, Related};
use crate::{FillMode, Persistable, Result};

use futures::future::try_join_all;
use weave_core::{
    schema::{Association, Model, ModelId},
    value::is_missing,
    Error, Registry, Value,
};

/// Outcome of one `fill` entry, applied once every entry completed.
enum Entry {
    Attribute(String, Value),
    Extra(String, Value),
    Association(String, Related),
    Skip,
}

impl Instance {
    pub(super) async fn fill_values(&mut self, values: Input) -> Result<()> {
        let entries = values.into_entries()?;
        let registry = self.db.registry().clone();
        let model = registry.model(self.model);

        let this = &*self;
        let entries = try_join_all(
            entries
                .into_iter()
                .map(|(key, value)| this.fill_entry(&registry, model, key, value)),
        )
        .await?;

        for entry in entries {
            match entry {
                Entry::Attribute(name, value) => self.write_attribute(name, value),
                Entry::Extra(name, value) => {
                    self.extras.insert(name, value);
                }
                Entry::Association(name, related) => self.set_pending(name, related),
                Entry::Skip => {}
            }
        }

        self.refresh_new_record();
        Ok(())
    }

    async fn fill_entry(
        &self,
        registry: &Registry,
        model: &Model,
        key: String,
        value: Input,
    ) -> Result<Entry> {
        if let Some(edge) = model.association(&key) {
            return Ok(match self.hydrate(edge, value).await? {
                Some(related) => Entry::Association(key, related),
                None => Entry::Skip,
            });
        }

        if let Some(attribute) = model.attribute(&key) {
            // Existing identity is never overwritten by inbound data
            if attribute.primary_key && !is_missing(self.values.get(&key)) {
                tracing::debug!(path = %self.deep_path, attribute = %key, "primary key already set");
                return Ok(Entry::Skip);
            }

            let value = attribute.write(&key, value.into_value())?;
            return Ok(Entry::Attribute(key, value));
        }

        if self.db.config().fill_mode == FillMode::Strict
            && !is_through_payload(registry, model.id, &key)
        {
            return Err(Error::unknown_attribute(&model.name, &key));
        }

        Ok(Entry::Extra(key, value.into_value()))
    }

    /// A later `fill` of the same association replaces what is pending.
    fn set_pending(&mut self, name: String, related: Related) {
        match self.pending.iter_mut().find(|(pending, _)| *pending == name) {
            Some((_, current)) => *current = related,
            None => self.pending.push((name, related)),
        }
    }

    /// Moves this instance to `path` in a new graph, along with everything
    /// nested below it.
    fn reroot(&mut self, path: String) {
        let pending = self
            .pending
            .iter_mut()
            .map(|(name, related)| (&*name, related));

        for (name, related) in pending.chain(self.loaded.iter_mut()) {
            let base = format!("{path}.{name}");
            match related {
                Related::One(child) => child.reroot(base),
                Related::Many(children) => {
                    for (index, child) in children.iter_mut().enumerate() {
                        child.reroot(format!("{base}[{index}]"));
                    }
                }
            }
        }

        self.deep_path = path;
    }

    /// Builds the nested instances of one association entry.
    async fn hydrate(&self, edge: &Association, value: Input) -> Result<Option<Related>> {
        let path = format!("{}.{}", self.deep_path, edge.name);

        if matches!(value, Input::Value(Value::Null)) {
            return Ok(None);
        }

        if !edge.is_many() {
            if value.is_list() {
                return Err(Error::validation(format!(
                    "`{path}` holds a single `{}`, found a list",
                    self.db.registry().model(edge.target).name
                )));
            }

            let child = self.nested(edge.target, path, value).await?;
            return Ok(Some(Related::One(Box::new(child))));
        }

        let children = try_join_all(
            value
                .into_list()
                .into_iter()
                .enumerate()
                .map(|(index, item)| self.nested(edge.target, format!("{path}[{index}]"), item)),
        )
        .await?;

        Ok(Some(Related::Many(children)))
    }

    /// One nested instance: a reused instance of the target model, or a new
    /// one filled from plain data.
    async fn nested(&self, target: ModelId, path: String, value: Input) -> Result<Instance> {
        match value {
            Input::Instance(mut instance) => {
                if instance.model != target {
                    return Err(Error::validation(format!(
                        "`{path}` expects a `{}` instance, found a `{}` instance",
                        self.db.registry().model(target).name,
                        instance.model().name
                    )));
                }

                instance.reroot(path);
                Ok(instance)
            }
            value => {
                let mut child = Instance::new(self.db.clone(), target, path);
                child.fill(value).await?;
                Ok(child)
            }
        }
    }
}

/// Nested instances of a many-to-many association may carry the join row's
/// payload under the through table's name.
fn is_through_payload(registry: &Registry, model: ModelId, key: &str) -> bool {
    registry
        .models()
        .flat_map(|owner| owner.associations.values())
        .any(|edge| edge.target == model && edge.through_name() == Some(key))
}
