use crate::{value::type_name, Error, Result, Value};

use serde::{Deserialize, Serialize};

/// A declared model attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Primitive type of the stored value
    #[serde(rename = "type")]
    pub ty: AttributeType,

    /// True if the attribute is part of the primary key
    #[serde(default)]
    pub primary_key: bool,

    /// Specified if and how the driver should populate the value on insert
    #[serde(default)]
    pub auto: Option<AutoStrategy>,

    #[serde(default = "default_allow_null")]
    pub allow_null: bool,

    #[serde(default)]
    pub unique: bool,

    /// Value used on insert when the instance carries none
    #[serde(default)]
    pub default: Option<Value>,

    /// Input transforms applied, in order, by every attribute write
    #[serde(default)]
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Integer,
    Float,
    Boolean,
    String,
    Text,
    Uuid,
    Date,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoStrategy {
    /// Integer sequence assigned by the driver
    Increment,
    /// Random v4 UUID assigned by the driver
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Trim,
    Lowercase,
    Uppercase,
}

fn default_allow_null() -> bool {
    true
}

impl Attribute {
    pub fn new(ty: AttributeType) -> Self {
        Self {
            ty,
            primary_key: false,
            auto: None,
            allow_null: true,
            unique: false,
            default: None,
            transforms: vec![],
        }
    }

    /// Shorthand for an auto-increment integer primary key.
    pub fn id() -> Self {
        Self::new(AttributeType::Integer)
            .primary_key()
            .auto(AutoStrategy::Increment)
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.allow_null = false;
        self
    }

    pub fn auto(mut self, strategy: AutoStrategy) -> Self {
        self.auto = Some(strategy);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// The attribute-write primitive: applies the input transforms and checks
    /// the result against the declared type.
    ///
    /// `null` is accepted for every type; whether a null may be persisted is
    /// the driver's concern since auto-populated keys start out null.
    pub fn write(&self, name: &str, value: Value) -> Result<Value> {
        let value = self
            .transforms
            .iter()
            .fold(value, |value, transform| transform.apply(value));

        if self.ty.accepts(&value) {
            Ok(value)
        } else {
            Err(Error::validation(format!(
                "`{name}` expects {}, found {}",
                self.ty.describe(),
                type_name(&value)
            )))
        }
    }
}

impl AttributeType {
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (AttributeType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (AttributeType::Float, Value::Number(_)) => true,
            (AttributeType::Boolean, Value::Bool(_)) => true,
            (AttributeType::String | AttributeType::Text | AttributeType::Date, Value::String(_)) => {
                true
            }
            (AttributeType::Uuid, Value::String(s)) => uuid::Uuid::parse_str(s).is_ok(),
            (AttributeType::Json, _) => true,
            _ => false,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            AttributeType::Integer => "an integer",
            AttributeType::Float => "a number",
            AttributeType::Boolean => "a boolean",
            AttributeType::String | AttributeType::Text => "a string",
            AttributeType::Uuid => "a UUID string",
            AttributeType::Date => "a date string",
            AttributeType::Json => "a JSON value",
        }
    }
}

impl Transform {
    /// Applies the transform to string values; anything else passes through.
    pub fn apply(self, value: Value) -> Value {
        let Value::String(s) = value else {
            return value;
        };

        Value::String(match self {
            Transform::Trim => s.trim().to_string(),
            Transform::Lowercase => s.to_lowercase(),
            Transform::Uppercase => s.to_uppercase(),
        })
    }
}
