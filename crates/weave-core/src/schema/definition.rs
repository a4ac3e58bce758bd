use super::{Attribute, AssociationSpec, HookKind, Hooks, Method, StaticMethod};
use crate::{Result, Row, Value};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// A schema as declared by its author, before registration.
///
/// Attributes, options and associations deserialize from a schema file.
/// Hooks and method extensions are closures and can only be attached through
/// the builder methods.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub attributes: IndexMap<String, Attribute>,

    #[serde(default)]
    pub options: ModelOptions,

    /// Association kind (`oneToOne`, `oneToMany`, `manyToMany`) to the list of
    /// declarations of that kind. Kinds are validated when wiring.
    #[serde(default)]
    pub associations: IndexMap<String, Vec<AssociationSpec>>,

    #[serde(skip)]
    pub hooks: Hooks,

    #[serde(skip)]
    pub methods: IndexMap<String, Method>,

    #[serde(skip)]
    pub statics: IndexMap<String, StaticMethod>,

    /// File the definition was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Process-wide model defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefineOptions {
    pub charset: String,
    pub collate: String,

    /// Derive `snake_case` foreign keys and through-table columns rather
    /// than `camelCase` ones
    pub underscored: bool,
}

/// Per-schema overrides of [`DefineOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOptions {
    /// Storage table, defaults to the lower-cased schema name
    pub table_name: Option<String>,
    pub charset: Option<String>,
    pub collate: Option<String>,
    pub underscored: Option<bool>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Declares an association. `kind` is usually an
    /// [`AssociationKind`](super::AssociationKind).
    pub fn association(mut self, kind: impl fmt::Display, spec: impl Into<AssociationSpec>) -> Self {
        self.associations
            .entry(kind.to_string())
            .or_default()
            .push(spec.into());
        self
    }

    pub fn hook<F>(mut self, kind: HookKind, f: F) -> Self
    where
        F: Fn(&mut Row) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.add(kind, f);
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Row, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Method::new(f));
        self
    }

    pub fn static_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.statics.insert(name.into(), StaticMethod::new(f));
        self
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }
}

impl Default for DefineOptions {
    fn default() -> Self {
        Self {
            charset: "utf8".to_string(),
            collate: "utf8_general_ci".to_string(),
            underscored: true,
        }
    }
}

impl DefineOptions {
    /// Applies per-schema overrides on top of these defaults.
    pub fn merge(&self, options: &ModelOptions) -> DefineOptions {
        DefineOptions {
            charset: options.charset.clone().unwrap_or_else(|| self.charset.clone()),
            collate: options.collate.clone().unwrap_or_else(|| self.collate.clone()),
            underscored: options.underscored.unwrap_or(self.underscored),
        }
    }
}

impl ModelOptions {
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn underscored(mut self, underscored: bool) -> Self {
        self.underscored = Some(underscored);
        self
    }
}
