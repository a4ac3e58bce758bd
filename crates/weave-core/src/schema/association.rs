use super::{ModelId, Name};

use std::fmt;

/// A wired, directed association edge between two registered models.
#[derive(Debug, Clone)]
pub struct Association {
    /// Accessor name on the source model, also the key `fill` recognizes
    pub name: String,

    pub relation: Relation,

    /// Model declaring the accessor
    pub source: ModelId,

    /// Associated model
    pub target: ModelId,

    /// Foreign key attribute. Lives on the source model for `BelongsTo`, on
    /// the target model for `HasMany`/`HasOne`, and is the through-table
    /// column pointing at the source for `BelongsToMany`.
    pub foreign_key: String,

    /// Join table for `BelongsToMany` edges
    pub through: Option<Through>,

    /// Accessor of the inverse edge on the target model, when installed
    pub pair: Option<String>,

    pub accessors: Accessors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    BelongsTo,
    HasMany,
    HasOne,
    BelongsToMany,
}

/// Names of the instance-level primitives an edge exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessors {
    pub get: String,
    pub set: String,
    pub create: String,
}

/// Join table of a many-to-many edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Through {
    /// Name as declared; also the key under which `fill` expects a through
    /// payload on nested instances
    pub name: String,

    /// Storage table
    pub table: String,

    /// Set when the through table is itself a registered model
    pub model: Option<ModelId>,

    /// Column referencing the edge's source model
    pub source_key: String,

    /// Column referencing the edge's target model
    pub target_key: String,
}

impl Association {
    /// Returns `true` when the accessor holds a list of instances.
    pub fn is_many(&self) -> bool {
        self.relation.is_many()
    }

    /// Through payload key expected on nested instances, if any.
    pub fn through_name(&self) -> Option<&str> {
        self.through.as_ref().map(|through| through.name.as_str())
    }
}

impl Relation {
    pub fn is_many(self) -> bool {
        matches!(self, Relation::HasMany | Relation::BelongsToMany)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::BelongsTo => "belongsTo",
            Relation::HasMany => "hasMany",
            Relation::HasOne => "hasOne",
            Relation::BelongsToMany => "belongsToMany",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Accessors {
    /// Derives `getX`/`setX`/`createX` from the accessor name. The create
    /// accessor always uses the singular form.
    pub fn new(accessor: &str, singular: &str) -> Self {
        let upper = Name::new(accessor).upper_camel_case();
        Self {
            get: format!("get{upper}"),
            set: format!("set{upper}"),
            create: format!("create{}", Name::new(singular).upper_camel_case()),
        }
    }
}

impl Through {
    /// The same join table seen from the other side.
    pub fn reversed(&self) -> Through {
        Through {
            source_key: self.target_key.clone(),
            target_key: self.source_key.clone(),
            ..self.clone()
        }
    }
}
