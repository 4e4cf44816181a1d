//! The context handed to templates, and its collection from sources.

mod collector;

use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;
use serde_json::Value;

use crate::source::ScriptFunction;

pub use collector::{collect_context, ContextCollector};

/// A single context entry: plain data, or a function exported by a script.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Data(Value),
    Function(ScriptFunction),
}

impl ContextValue {
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            ContextValue::Data(value) => Some(value),
            ContextValue::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            ContextValue::Function(function) => Some(function),
            ContextValue::Data(_) => None,
        }
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        ContextValue::Data(value)
    }
}

impl From<ScriptFunction> for ContextValue {
    fn from(function: ScriptFunction) -> Self {
        ContextValue::Function(function)
    }
}

/// Variables available to templates, in insertion order.
///
/// Contexts are built by merging the partial contexts of every configuration
/// source. Merging is shallow: a later key replaces the earlier value of the
/// same name wholesale, nested mappings are not combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: IndexMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets `key`, returning the value it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, ContextValue> {
        self.entries.iter()
    }

    /// Applies `overlay` on top of this context; its keys win.
    pub fn merge(&mut self, overlay: Context) {
        for (key, value) in overlay {
            self.entries.insert(key, value);
        }
    }

    /// The data entries as one JSON object, the shape the template engine renders.
    pub fn to_data(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), value.as_data()?.clone())))
                .collect(),
        )
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &ScriptFunction)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| Some((key.as_str(), value.as_function()?)))
    }
}

impl From<serde_json::Map<String, Value>> for Context {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl<V: Into<ContextValue>> FromIterator<(String, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl IntoIterator for Context {
    type Item = (String, ContextValue);
    type IntoIter = IntoIter<String, ContextValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = (&'a String, &'a ContextValue);
    type IntoIter = Iter<'a, String, ContextValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
