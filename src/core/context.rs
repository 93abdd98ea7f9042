//! Workflow context - the fields accumulated across one run

use crate::core::step::StepError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields produced by a single step, merged into the context by the runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    /// Create an empty field set (a passthrough step returns this)
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Execution context for a workflow run
///
/// Created fresh when a run starts and discarded when it ends. Steps only ever
/// add fields; a field written again by a later step replaces the old value for
/// every step after it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowContext {
    values: BTreeMap<String, Value>,
}

impl WorkflowContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context seeded with initial fields
    pub fn from_fields(fields: Fields) -> Self {
        let mut context = Self::new();
        context.merge(fields);
        context
    }

    /// Set a single field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Merge a step's output into the context
    pub fn merge(&mut self, fields: Fields) {
        self.values.extend(fields);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether the field is present and non-null
    pub fn contains(&self, key: &str) -> bool {
        !matches!(self.values.get(key), None | Some(Value::Null))
    }

    /// Get a required field. Absent and `null` are both a contract violation.
    pub fn require(&self, key: &str) -> Result<&Value, StepError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Err(StepError::MissingField(key.to_string())),
            Some(value) => Ok(value),
        }
    }

    /// Get a required string field
    pub fn require_str(&self, key: &str) -> Result<&str, StepError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| StepError::InvalidField {
                field: key.to_string(),
                expected: "string",
            })
    }

    /// Get an optional string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The whole context as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone().into_iter().collect())
    }
}
