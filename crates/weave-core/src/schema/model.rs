use super::{
    Association, AssociationSpec, Attribute, DefineOptions, Hooks, Method, Name, StaticMethod,
};
use crate::{value::is_missing, Row};

use indexmap::IndexMap;
use std::{fmt, path::PathBuf};

/// A registered model.
#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the registry
    pub id: ModelId,

    /// Schema name the model was registered under
    pub name: String,

    /// Storage table
    pub table_name: String,

    /// Attributes in declaration order, including foreign keys added while
    /// wiring
    pub attributes: IndexMap<String, Attribute>,

    /// Wired association edges keyed by accessor name
    pub associations: IndexMap<String, Association>,

    /// Registry defaults merged with the schema's own options
    pub define: DefineOptions,

    pub hooks: Hooks,
    pub methods: IndexMap<String, Method>,
    pub statics: IndexMap<String, StaticMethod>,

    /// Association declarations, wired by the registry
    pub declared: IndexMap<String, Vec<AssociationSpec>>,

    /// File the schema was loaded from
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

impl Model {
    /// Names of the primary-key attributes, in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes
            .iter()
            .filter(|(_, attribute)| attribute.primary_key)
            .map(|(name, _)| name.as_str())
    }

    pub fn has_primary_key(&self) -> bool {
        self.primary_key().next().is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.get(name)
    }

    /// Derives the new-record flag from a row.
    ///
    /// Returns `None` when the model declares no primary key, otherwise
    /// whether any primary-key attribute is null or absent.
    pub fn is_new_record(&self, row: &Row) -> Option<bool> {
        if !self.has_primary_key() {
            return None;
        }

        Some(self.primary_key().any(|name| is_missing(row.get(name))))
    }

    /// Primary-key values of a row, keyed by attribute name.
    pub fn key_of(&self, row: &Row) -> Row {
        self.primary_key()
            .map(|name| (name.to_string(), row.get(name).cloned().unwrap_or_default()))
            .collect()
    }

    /// Where the model was declared, for diagnostics.
    pub fn location(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "<inline definition>".to_string(),
        }
    }

    /// Name of a key attribute referencing `target`, following the model's
    /// naming convention.
    pub(crate) fn key_name(&self, target: &str) -> String {
        let name = Name::new(target);
        if self.define.underscored {
            format!("{}_id", name.snake_case())
        } else {
            format!("{}Id", name.camel_case())
        }
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelId({})", self.0)
    }
}
