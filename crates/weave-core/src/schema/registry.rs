mod wire;

use super::{AssociationKind, AssociationSpec, DefineOptions, Model, ModelId, SchemaDefinition};
use crate::{Error, Result, Value};

use indexmap::IndexMap;

/// Registered models and the association edges wired between them.
///
/// The registry is only mutated while the database is being built. Once
/// built it is shared read-only behind an `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    models: IndexMap<String, Model>,

    /// Defaults merged into every registered model
    define: DefineOptions,
}

impl Registry {
    pub fn new(define: DefineOptions) -> Self {
        Self {
            models: IndexMap::new(),
            define,
        }
    }

    /// Registers `definition` under `name`.
    ///
    /// Re-registering a name replaces the previous model but keeps its id.
    pub fn register_model(&mut self, name: &str, definition: SchemaDefinition) -> ModelId {
        let id = ModelId(self.models.get_index_of(name).unwrap_or(self.models.len()));

        let SchemaDefinition {
            attributes,
            options,
            associations,
            hooks,
            methods,
            statics,
            source,
        } = definition;

        let model = Model {
            id,
            name: name.to_string(),
            table_name: options
                .table_name
                .clone()
                .unwrap_or_else(|| name.to_lowercase()),
            attributes,
            associations: IndexMap::new(),
            define: self.define.merge(&options),
            hooks,
            methods,
            statics,
            declared: associations,
            source,
        };

        self.models.insert(name.to_string(), model);
        id
    }

    /// Get a model by ID
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        &self.models[id.into().0]
    }

    /// Get a model by its schema name, failing with an error listing every
    /// registered name.
    pub fn model_by_name(&self, name: &str) -> Result<&Model> {
        self.get(name)
            .ok_or_else(|| Error::unknown_model(name, self.names()))
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn define(&self) -> &DefineOptions {
        &self.define
    }

    /// Wires every declared association of every model.
    ///
    /// Models are processed in registration order. Within a model, unknown
    /// kinds are rejected first, then kinds are wired in the order
    /// `oneToOne`, `oneToMany`, `manyToMany`.
    pub fn wire_all_associations(&mut self) -> Result<()> {
        for index in 0..self.models.len() {
            let model = &self.models[index];
            let name = model.name.clone();
            let declared = model.declared.clone();

            let mut by_kind = Vec::with_capacity(declared.len());
            for (kind, specs) in &declared {
                match kind.parse::<AssociationKind>() {
                    Ok(kind) => by_kind.push((kind, specs)),
                    Err(err) => {
                        let declaration = Value::Array(
                            specs.iter().map(AssociationSpec::to_value).collect(),
                        );
                        return Err(err.context(Error::schema_source(
                            &name,
                            &model.location(),
                            format!("{kind} = {declaration}"),
                        )));
                    }
                }
            }

            for kind in AssociationKind::ALL {
                for (_, specs) in by_kind.iter().filter(|(k, _)| *k == kind) {
                    for spec in specs.iter() {
                        self.wire_association(&name, kind, spec)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Wires one declared association of `source`.
    ///
    /// Both directions are validated before either is installed, so a failed
    /// declaration leaves the registry untouched. Errors carry the declaring
    /// schema, its location and the declaration.
    pub fn wire_association(
        &mut self,
        source: &str,
        kind: AssociationKind,
        spec: &AssociationSpec,
    ) -> Result<()> {
        let model = self.model_by_name(source)?;
        let id = model.id;
        let location = model.location();

        self.plan(id, kind, spec)
            .map(|plan| self.install(plan))
            .map_err(|err| err.context(Error::schema_source(source, &location, spec.to_string())))
    }
}
