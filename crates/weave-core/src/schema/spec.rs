use crate::{value::type_name, Error, Result, Value};

use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Association kinds a schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// One entry of a schema's `associations` lists, as written by the schema
/// author.
///
/// Three shapes are accepted: a bare target name, a list
/// `[target, options?, reverse_options?]`, or a table
/// `{ table, options?, reverse_options? }`. Anything else is kept as
/// [`AssociationSpec::Invalid`] so the error surfaces during wiring, next to
/// the declaring schema.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationSpec {
    Table(String),
    Tuple(String, AssociationOptions, AssociationOptions),
    Record {
        table: String,
        options: AssociationOptions,
        reverse_options: AssociationOptions,
    },
    Invalid(Value),
}

/// Options for one direction of an association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssociationOptions {
    /// Accessor name, overriding the one derived from the target model name
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_name: Option<String>,

    /// Foreign key attribute, overriding `<belongs-to accessor>_id`
    #[serde(alias = "foreignKey", skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,

    /// Through table (registered model name or bare join table name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,

    /// Set on reverse options to skip installing the inverse edge
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// An association spec reduced to its three components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAssociation {
    pub target: String,
    pub forward: AssociationOptions,
    pub reverse: AssociationOptions,
}

impl AssociationKind {
    pub const ALL: [AssociationKind; 3] = [
        AssociationKind::OneToOne,
        AssociationKind::OneToMany,
        AssociationKind::ManyToMany,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssociationKind::OneToOne => "oneToOne",
            AssociationKind::OneToMany => "oneToMany",
            AssociationKind::ManyToMany => "manyToMany",
        }
    }
}

impl FromStr for AssociationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "oneToOne" | "one_to_one" => Ok(AssociationKind::OneToOne),
            "oneToMany" | "one_to_many" => Ok(AssociationKind::OneToMany),
            "manyToMany" | "many_to_many" => Ok(AssociationKind::ManyToMany),
            other => Err(Error::invalid_association(format!(
                "`{other}` associations are not supported, expected one of `oneToOne`, `oneToMany`, `manyToMany`"
            ))),
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_name(mut self, name: impl Into<String>) -> Self {
        self.as_name = Some(name.into());
        self
    }

    pub fn foreign_key(mut self, name: impl Into<String>) -> Self {
        self.foreign_key = Some(name.into());
        self
    }

    pub fn through(mut self, table: impl Into<String>) -> Self {
        self.through = Some(table.into());
        self
    }

    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Parses one options slot. `null` means defaults and `false` disables
    /// the direction.
    fn from_slot(value: Option<&Value>) -> Option<Self> {
        match value {
            None | Some(Value::Null) => Some(Self::default()),
            Some(Value::Bool(false)) => Some(Self::disabled()),
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
            Some(_) => None,
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl AssociationSpec {
    /// Classifies a raw declaration value.
    pub fn from_value(value: Value) -> Self {
        let parsed = match &value {
            Value::String(table) => Some(AssociationSpec::Table(table.clone())),
            Value::Array(items) if (1..=3).contains(&items.len()) => {
                match (
                    items[0].as_str(),
                    AssociationOptions::from_slot(items.get(1)),
                    AssociationOptions::from_slot(items.get(2)),
                ) {
                    (Some(table), Some(options), Some(reverse)) => Some(AssociationSpec::Tuple(
                        table.to_string(),
                        options,
                        reverse,
                    )),
                    _ => None,
                }
            }
            Value::Object(map) => {
                let known = ["table", "options", "reverse_options", "reverseOptions"];
                let reverse = map.get("reverse_options").or(map.get("reverseOptions"));

                match (
                    map.get("table").and_then(Value::as_str),
                    AssociationOptions::from_slot(map.get("options")),
                    AssociationOptions::from_slot(reverse),
                ) {
                    (Some(table), Some(options), Some(reverse_options))
                        if map.keys().all(|key| known.contains(&key.as_str())) =>
                    {
                        Some(AssociationSpec::Record {
                            table: table.to_string(),
                            options,
                            reverse_options,
                        })
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        parsed.unwrap_or(AssociationSpec::Invalid(value))
    }

    /// Reduces the spec to `{target, forward, reverse}`.
    pub fn normalize(&self) -> Result<NormalizedAssociation> {
        match self {
            AssociationSpec::Table(table) => Ok(NormalizedAssociation {
                target: table.clone(),
                forward: AssociationOptions::default(),
                reverse: AssociationOptions::default(),
            }),
            AssociationSpec::Tuple(table, forward, reverse)
            | AssociationSpec::Record {
                table,
                options: forward,
                reverse_options: reverse,
            } => Ok(NormalizedAssociation {
                target: table.clone(),
                forward: forward.clone(),
                reverse: reverse.clone(),
            }),
            AssociationSpec::Invalid(value) => Err(Error::invalid_association(format!(
                "an association must be a table name, a `[table, options, reverse_options]` list \
                 or a `{{ table, options, reverse_options }}` table, {} found",
                type_name(value)
            ))),
        }
    }

    /// Renders the declaration back to its data form, for diagnostics.
    pub fn to_value(&self) -> Value {
        fn options(options: &AssociationOptions) -> Value {
            if options.disabled && options.is_default_except_disabled() {
                Value::Bool(false)
            } else {
                serde_json::to_value(options).unwrap_or(Value::Null)
            }
        }

        match self {
            AssociationSpec::Table(table) => Value::String(table.clone()),
            AssociationSpec::Tuple(table, forward, reverse) => {
                let mut items = vec![Value::String(table.clone())];
                if !forward.is_default() || !reverse.is_default() {
                    items.push(options(forward));
                }
                if !reverse.is_default() {
                    items.push(options(reverse));
                }
                Value::Array(items)
            }
            AssociationSpec::Record {
                table,
                options: forward,
                reverse_options,
            } => serde_json::json!({
                "table": table,
                "options": options(forward),
                "reverse_options": options(reverse_options),
            }),
            AssociationSpec::Invalid(value) => value.clone(),
        }
    }
}

impl AssociationOptions {
    fn is_default_except_disabled(&self) -> bool {
        Self {
            disabled: false,
            ..self.clone()
        }
        .is_default()
    }
}

impl fmt::Display for AssociationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}

impl From<&str> for AssociationSpec {
    fn from(table: &str) -> Self {
        AssociationSpec::Table(table.to_string())
    }
}

impl From<String> for AssociationSpec {
    fn from(table: String) -> Self {
        AssociationSpec::Table(table)
    }
}

impl From<(&str, AssociationOptions)> for AssociationSpec {
    fn from((table, options): (&str, AssociationOptions)) -> Self {
        AssociationSpec::Tuple(table.to_string(), options, AssociationOptions::default())
    }
}

impl From<(&str, AssociationOptions, AssociationOptions)> for AssociationSpec {
    fn from((table, options, reverse): (&str, AssociationOptions, AssociationOptions)) -> Self {
        AssociationSpec::Tuple(table.to_string(), options, reverse)
    }
}

impl<'de> Deserialize<'de> for AssociationSpec {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(AssociationSpec::from_value)
    }
}
