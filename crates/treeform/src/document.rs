//! a single generated resource description
//!
//! Documents are built in two phases. Generators create them and set raw properties, which
//! may contain `<% name %>` placeholders referring to documents that do not exist yet.
//! Once the whole tree is assembled, [Document::finalize] produces the resolved output
//! without touching the raw properties, so one document can be finalized against any
//! number of data bags.
use crate::data_bag::DataBag;
use crate::error::{Error, Result};
use crate::interpolate;
use crate::value::{Object, Value};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    key: String,
    resource_type: String,
    properties: Value,
    exports: IndexMap<String, String>,
    origin: Option<PathBuf>,
}

impl Document {
    pub fn new(
        key: impl AsRef<str>,
        resource_type: impl Into<String>,
        properties: impl Into<Value>,
    ) -> Result<Self> {
        let resource_type = resource_type.into();
        if resource_type.is_empty() {
            return Err(Error::invalid("resource type must not be empty"));
        }

        let canonical = canonical_key(key.as_ref());
        if canonical.is_empty() {
            return Err(Error::invalid(format!(
                "document key {:?} has no alphanumeric characters",
                key.as_ref()
            )));
        }

        let properties = match properties.into() {
            Value::Null => Value::object(),
            object @ Value::Object(_) => object,
            other => {
                return Err(Error::invalid(format!(
                    "properties of {canonical} must be an object, got {}",
                    other.kind()
                )))
            }
        };

        Ok(Self {
            key: canonical,
            resource_type,
            properties,
            exports: Default::default(),
            origin: None,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Raw properties, placeholders included
    pub fn properties(&self) -> &Value {
        &self.properties
    }

    pub fn property<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        self.properties.get_path(path)
    }

    pub fn exports(&self) -> &IndexMap<String, String> {
        &self.exports
    }

    /// Generator file the document came from
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Make the document reachable as `<% name %>` once exports are collected
    pub fn export(&mut self, name: impl Into<String>) -> &mut Self {
        self.exports.insert(name.into(), self.key.clone());
        self
    }

    pub fn with_origin(&mut self, origin: impl Into<PathBuf>) -> &mut Self {
        self.origin = Some(origin.into());
        self
    }

    /// Get the property at `path`, creating it (and every missing parent object) if absent
    ///
    /// An existing value is returned untouched, `default` is only used for new leaves.
    pub fn ensure_property<S: AsRef<str>>(
        &mut self,
        path: &[S],
        default: impl Into<Value>,
    ) -> Result<&mut Value> {
        let Some((leaf, parents)) = path.split_last() else {
            return Err(Error::invalid("property path must not be empty"));
        };

        let mut current: &mut Object = self
            .properties
            .as_object_mut()
            .expect("document properties are always an object");

        for (depth, segment) in parents.iter().enumerate() {
            let next = current
                .entry(segment.as_ref().to_string())
                .or_insert_with(Value::object);

            current = match next {
                Value::Object(object) => object,
                other => {
                    return Err(Error::invalid(format!(
                        "property {} of {} is a {}, not an object",
                        join_path(&path[..=depth]),
                        self.key,
                        other.kind()
                    )))
                }
            };
        }

        Ok(current
            .entry(leaf.as_ref().to_string())
            .or_insert_with(|| default.into()))
    }

    /// Set the property at `path`, replacing any existing value
    pub fn set_property<S: AsRef<str>>(
        &mut self,
        path: &[S],
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let value = value.into();
        *self.ensure_property(path, Value::Null)? = value;
        Ok(self)
    }

    /// Resolve all placeholders against `data`
    ///
    /// Pure and synchronous; the raw properties are left as they are.
    pub fn finalize(&self, data: &DataBag) -> FinalizedDocument {
        FinalizedDocument {
            resource_type: self.resource_type.clone(),
            properties: interpolate::resolve(&self.properties, data),
        }
    }
}

/// Output shape consumed by packaging
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FinalizedDocument {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
}

/// `orders list` -> `OrdersList`, `api_RES` -> `ApiRES`
///
/// Parts are split on every non-alphanumeric character and capitalized. Segments of a scope
/// token start with a lowercase letter and hold no uppercase letter, so every capital that
/// comes from a path segment marks a segment boundary and two scopes keep distinct keys for
/// the same suffix.
pub fn canonical_key(key: &str) -> String {
    key.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}
