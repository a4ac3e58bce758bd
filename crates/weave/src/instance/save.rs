use super::{EdgeContext, Input, Instance, Related};
use crate::{Persistable, Result};

use async_recursion::async_recursion;
use futures::future::try_join_all;
use std::mem;
use weave_core::{
    driver::operation::{CreateRelated, Insert, LinkTarget, SetAssociation, Update},
    schema::{Association, HookKind, Model, Relation},
    value::{is_missing, row_from_value, type_name},
    Error, Row, Value,
};

impl Instance {
    #[async_recursion]
    pub(super) async fn deep_save_impl<'a>(
        &'a mut self,
        context: Option<EdgeContext<'a>>,
    ) -> Result<()> {
        if let Some(cx) = context {
            self.check_edge(cx)?;
        }

        match context {
            // Only a persisted parent can create records through its edges
            Some(cx)
                if self.is_new_record == Some(true) && cx.parent.is_new_record == Some(false) =>
            {
                self.create_via(cx).await
            }
            _ => {
                self.save().await?;
                self.save_pending().await
            }
        }
    }

    /// Creates the record through the parent's association, then continues
    /// the deep save with the persisted instance in place of `self`.
    ///
    /// Once the record exists the persisted instance replaces `self` even if
    /// the rest of the save fails, so a retry updates instead of creating.
    async fn create_via<'a>(&'a mut self, cx: EdgeContext<'a>) -> Result<()> {
        let mut persisted = self.create_through(cx).await?;
        persisted.refill(self);
        let res = persisted.deep_save_impl(Some(cx)).await;
        *self = persisted;
        res
    }

    /// The parent's association must hold records of this instance's model.
    fn check_edge(&self, cx: EdgeContext<'_>) -> Result<()> {
        let edge = cx.parent.edge(cx.association)?;
        if edge.target == self.model {
            return Ok(());
        }

        let registry = self.db.registry();
        Err(Error::validation(format!(
            "`{}` cannot be saved through `{}.{}`, which holds `{}` records",
            self.deep_path,
            cx.parent.model().name,
            cx.association,
            registry.model(edge.target).name
        )))
    }

    async fn create_through(&self, cx: EdgeContext<'_>) -> Result<Instance> {
        let registry = self.db.registry().clone();
        let model = registry.model(self.model);
        let edge = cx.parent.edge(cx.association)?;

        let through = self.through_payload(edge)?;
        let mut values = self.insert_values(model);
        model.hooks.run(HookKind::BeforeSave, &mut values)?;
        model.hooks.run(HookKind::BeforeCreate, &mut values)?;

        tracing::debug!(
            path = %self.deep_path,
            parent = %cx.parent.deep_path,
            association = cx.association,
            "create related"
        );

        let mut record = self
            .db
            .exec(CreateRelated {
                model: cx.parent.model,
                key: cx.parent.key(),
                association: cx.association.to_string(),
                values,
                through,
            })
            .await?
            .rows
            .into_record()?;

        model.hooks.run(HookKind::AfterCreate, &mut record)?;
        model.hooks.run(HookKind::AfterSave, &mut record)?;

        Ok(Instance::from_row(
            self.db.clone(),
            self.model,
            record,
            self.deep_path.clone(),
        ))
    }

    /// Moves the unsaved state of `original` onto this freshly created
    /// instance. Attribute values the stored record lacks are written back
    /// so the following save persists them.
    fn refill(&mut self, original: &mut Instance) {
        self.pending = mem::take(&mut original.pending);
        self.extras = mem::take(&mut original.extras);
        self.loaded = mem::take(&mut original.loaded);

        for (name, value) in mem::take(&mut original.values) {
            if value.is_null() || !is_missing(self.values.get(&name)) {
                continue;
            }
            self.write_attribute(name, value);
        }

        self.refresh_new_record();
    }

    /// The base save primitive: insert a new record, or update the changed
    /// attributes of an existing one, running the model's hooks.
    async fn save(&mut self) -> Result<()> {
        let registry = self.db.registry().clone();
        let model = registry.model(self.model);

        let record = match self.is_new_record {
            Some(true) => self.insert(model).await?,
            None if !self.persisted => self.insert(model).await?,
            None => {
                return Err(Error::validation(format!(
                    "`{}` declares no primary key, a stored record cannot be updated",
                    model.name
                )))
            }
            Some(false) => match self.update(model).await? {
                Some(record) => record,
                None => return Ok(()),
            },
        };

        self.load_row(record);
        Ok(())
    }

    async fn insert(&self, model: &Model) -> Result<Row> {
        let mut values = self.insert_values(model);
        model.hooks.run(HookKind::BeforeSave, &mut values)?;
        model.hooks.run(HookKind::BeforeCreate, &mut values)?;

        tracing::debug!(path = %self.deep_path, model = %model.name, "insert");

        let mut record = self
            .db
            .exec(Insert {
                model: self.model,
                values,
            })
            .await?
            .rows
            .into_record()?;

        model.hooks.run(HookKind::AfterCreate, &mut record)?;
        model.hooks.run(HookKind::AfterSave, &mut record)?;
        Ok(record)
    }

    /// Returns `None` when no attribute changed.
    async fn update(&mut self, model: &Model) -> Result<Option<Row>> {
        let mut values = self.values.clone();
        model.hooks.run(HookKind::BeforeSave, &mut values)?;
        for (name, value) in values {
            if model.attributes.contains_key(&name) {
                self.write_attribute(name, value);
            }
        }

        if self.changed.is_empty() {
            tracing::debug!(path = %self.deep_path, "nothing to update");
            return Ok(None);
        }

        let values = self
            .changed
            .iter()
            .map(|name| (name.clone(), self.values[name].clone()))
            .collect();

        tracing::debug!(path = %self.deep_path, model = %model.name, "update");

        let mut record = self
            .db
            .exec(Update {
                model: self.model,
                key: self.key(),
                values,
            })
            .await?
            .rows
            .into_record()?;

        model.hooks.run(HookKind::AfterSave, &mut record)?;
        Ok(Some(record))
    }

    /// Attribute values for an insert, with declared defaults filled in.
    fn insert_values(&self, model: &Model) -> Row {
        model
            .attributes
            .iter()
            .filter_map(|(name, attribute)| {
                let value = match self.values.get(name) {
                    value if is_missing(value) => attribute.default.clone().or(value.cloned()),
                    value => value.cloned(),
                };
                value.map(|value| (name.clone(), value))
            })
            .collect()
    }

    /// Saves every pending association concurrently, then records the saved
    /// children as loaded. On failure the pending graph is kept, including
    /// the children that were stored, so the save can be retried.
    async fn save_pending(&mut self) -> Result<()> {
        let mut pending = mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(());
        }

        let this = &*self;
        let res = try_join_all(
            pending
                .iter_mut()
                .map(|(association, related)| this.save_related(association, related)),
        )
        .await;

        if let Err(err) = res {
            self.pending = pending;
            return Err(err);
        }

        for (association, related) in pending {
            self.link_loaded(&association, &related)?;
            self.loaded.insert(association, related);
        }

        Ok(())
    }

    async fn save_related(&self, association: &str, related: &mut Related) -> Result<()> {
        let cx = EdgeContext {
            association,
            parent: self,
        };

        match related {
            Related::One(child) => child.deep_save(Some(cx)).await?,
            Related::Many(children) => {
                try_join_all(children.iter_mut().map(|child| child.deep_save(Some(cx)))).await?;
            }
        }

        self.set_association(association, related).await?;
        Ok(())
    }

    /// Mirrors a belongs-to link on the local foreign key.
    fn link_loaded(&mut self, association: &str, related: &Related) -> Result<()> {
        let edge = self.edge(association)?;
        if edge.relation != Relation::BelongsTo {
            return Ok(());
        }

        let foreign_key = edge.foreign_key.clone();
        let target = related
            .as_one()
            .and_then(|target| target.key().into_values().next())
            .unwrap_or(Value::Null);

        self.values.insert(foreign_key, target);
        Ok(())
    }

    /// Links this persisted instance to exactly the given persisted
    /// instances through `association`. Returns the number of linked
    /// records.
    ///
    /// Many-to-many targets contribute their through-table payload.
    pub async fn set_association(&self, association: &str, related: &Related) -> Result<u64> {
        let edge = self.edge(association)?;
        self.require_persisted(association)?;

        let targets = related
            .iter()
            .map(|target| {
                if target.is_new_record != Some(false) {
                    return Err(Error::validation(format!(
                        "`{}` has no stored identity to link",
                        target.deep_path
                    )));
                }

                Ok(LinkTarget {
                    key: target.key(),
                    through: target.through_payload(edge)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            path = %self.deep_path,
            association,
            targets = targets.len(),
            "set association"
        );

        self.db
            .exec(SetAssociation {
                model: self.model,
                key: self.key(),
                association: association.to_string(),
                targets,
            })
            .await?
            .rows
            .into_count()
    }

    /// Creates a record through `association` of this persisted instance.
    pub async fn create_related(
        &self,
        association: &str,
        values: impl Into<Input>,
    ) -> Result<Instance> {
        let edge = self.edge(association)?;
        self.require_persisted(association)?;

        let mut child = Instance::new(
            self.db.clone(),
            edge.target,
            format!("{}.{association}", self.deep_path),
        );
        child.fill(values.into()).await?;

        let path = child.deep_path.clone();
        child
            .create_via(EdgeContext {
                association,
                parent: self,
            })
            .await
            .map_err(|err| err.context(Error::deep_path(path)))?;

        Ok(child)
    }

    fn edge(&self, association: &str) -> Result<&Association> {
        let model = self.model();
        model.association(association).ok_or_else(|| {
            weave_core::err!("model `{}` has no association `{association}`", model.name)
        })
    }

    fn require_persisted(&self, association: &str) -> Result<()> {
        if self.is_new_record != Some(false) || !self.persisted {
            weave_core::bail!(
                "`{}` must be saved before using its `{association}` association",
                self.deep_path
            );
        }
        Ok(())
    }

    /// Join-row payload carried under the through table's name.
    fn through_payload(&self, edge: &Association) -> Result<Option<Row>> {
        let Some(name) = edge.through_name() else {
            return Ok(None);
        };

        match self.extras.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => row_from_value(value.clone()).map(Some).ok_or_else(|| {
                Error::validation(format!(
                    "`{}.{name}` expects an object, found {}",
                    self.deep_path,
                    type_name(value)
                ))
            }),
        }
    }
}
