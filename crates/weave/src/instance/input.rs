use super::Instance;
use crate::Result;

use indexmap::IndexMap;
use weave_core::{value::type_name, Error, Value};

/// Data accepted by `fill`.
///
/// Plain JSON covers most graphs. The other variants allow reusing live
/// instances inside an otherwise plain object.
#[derive(Debug)]
pub enum Input {
    Value(Value),
    Instance(Instance),
    List(Vec<Input>),
    Object(IndexMap<String, Input>),
}

impl Input {
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Input
    where
        K: Into<String>,
        V: Into<Input>,
    {
        Input::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub(crate) fn is_list(&self) -> bool {
        matches!(self, Input::List(_) | Input::Value(Value::Array(_)))
    }

    pub(crate) fn into_list(self) -> Vec<Input> {
        match self {
            Input::List(items) => items,
            Input::Value(Value::Array(items)) => items.into_iter().map(Input::Value).collect(),
            other => vec![other],
        }
    }

    /// The key/value pairs of an object input.
    pub(crate) fn into_entries(self) -> Result<Vec<(String, Input)>> {
        match self {
            Input::Object(entries) => Ok(entries.into_iter().collect()),
            Input::Value(Value::Object(entries)) => Ok(entries
                .into_iter()
                .map(|(key, value)| (key, Input::Value(value)))
                .collect()),
            Input::Instance(instance) => Ok(instance
                .values
                .into_iter()
                .chain(instance.extras)
                .map(|(key, value)| (key, Input::Value(value)))
                .collect()),
            other => Err(Error::validation(format!(
                "fill expects an object, found {}",
                other.describe()
            ))),
        }
    }

    /// Flattens the input to plain JSON. Instances contribute their
    /// attribute values.
    pub fn into_value(self) -> Value {
        match self {
            Input::Value(value) => value,
            Input::Instance(instance) => Value::Object(instance.values.into_iter().collect()),
            Input::List(items) => Value::Array(items.into_iter().map(Input::into_value).collect()),
            Input::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into_value()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Input::Value(value) => type_name(value),
            Input::Instance(_) => "instance",
            Input::List(_) => "array",
            Input::Object(_) => "object",
        }
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Value(value)
    }
}

impl From<Instance> for Input {
    fn from(value: Instance) -> Self {
        Input::Instance(value)
    }
}

impl From<Vec<Instance>> for Input {
    fn from(value: Vec<Instance>) -> Self {
        Input::List(value.into_iter().map(Input::Instance).collect())
    }
}

impl From<Vec<Input>> for Input {
    fn from(value: Vec<Input>) -> Self {
        Input::List(value)
    }
}

impl From<IndexMap<String, Input>> for Input {
    fn from(value: IndexMap<String, Input>) -> Self {
        Input::Object(value)
    }
}

impl<K: Into<String>, V: Into<Input>> FromIterator<(K, V)> for Input {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Input::object(iter)
    }
}
