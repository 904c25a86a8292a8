//! flat key/value data used by generators and by placeholder resolution
use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataBag {
    entries: IndexMap<String, Value>,
}

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Overwrites entries of `self` with the ones in `other`
    pub fn merge(&mut self, other: DataBag) {
        self.entries.extend(other.entries);
    }

    /// Adds entries of `other` that are not yet present
    pub fn merge_missing(&mut self, other: DataBag) {
        for (name, value) in other.entries {
            self.entries.entry(name).or_insert(value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `name=value` pair. The value is always a string.
    pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
        match assignment.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.into()))
            }
            _ => Err(Error::invalid(format!(
                "expected NAME=VALUE, got {assignment:?}"
            ))),
        }
    }

    /// Load a json or yaml file (by extension) holding one object
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        tracing::info!(path=%path.display(), "loading data file");
        let contents = std::fs::read_to_string(path)
            .map_err(|source| Error::io(path, source))?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let value: serde_json::Value = if is_json {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };

        Self::try_from(Value::from(value)).map_err(Into::into)
    }
}

impl TryFrom<Value> for DataBag {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            Value::Null => Ok(Self::default()),
            other => Err(Error::invalid(format!(
                "data must be an object, got {}",
                other.kind()
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<DataBag> for hcl::Value {
    fn from(value: DataBag) -> Self {
        hcl::Value::from(Value::Object(value.entries))
    }
}
