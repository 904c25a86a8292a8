//! finalized documents keyed by their canonical key
use crate::data_bag::DataBag;
use crate::document::{Document, FinalizedDocument};
use crate::error::{Error, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Stack {
    #[serde(rename = "Resources")]
    pub resources: IndexMap<String, FinalizedDocument>,
}

impl Stack {
    /// Finalize every document against `data`
    ///
    /// Two documents with the same canonical key are an error.
    pub fn finalize(documents: &[Document], data: &DataBag) -> Result<Self> {
        let mut origins: IndexMap<&str, Option<&Path>> = IndexMap::new();
        let mut resources = IndexMap::new();

        for document in documents {
            match origins.entry(document.key()) {
                Entry::Occupied(first) => {
                    return Err(Error::DuplicateKey {
                        key: document.key().to_string(),
                        first: first.get().map(Path::to_path_buf),
                        second: document.origin().map(Path::to_path_buf),
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(document.origin());
                }
            }

            resources.insert(document.key().to_string(), document.finalize(data));
        }

        tracing::debug!(count = resources.len(), "stack finalized");
        Ok(Self { resources })
    }
}

/// Data bag mapping every export name to the key of the exporting document
pub fn collect_exports(documents: &[Document]) -> Result<DataBag> {
    let mut exports: IndexMap<&str, &str> = IndexMap::new();

    for document in documents {
        for (name, key) in document.exports() {
            match exports.entry(name.as_str()) {
                Entry::Occupied(existing) if *existing.get() != key.as_str() => {
                    return Err(Error::DuplicateExport {
                        name: name.clone(),
                        first: existing.get().to_string(),
                        second: key.clone(),
                    })
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(key.as_str());
                }
            }
        }
    }

    Ok(exports.into_iter().collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn document(key: &str, properties: serde_json::Value) -> Document {
        Document::new(key, "AWS::ApiGateway::Resource", Value::from(properties)).unwrap()
    }

    #[test]
    fn exports_resolve_references() {
        let mut api = document("orders api", serde_json::json!({ "Name": "orders" }));
        api.export("api");
        let resource = document(
            "orders resource",
            serde_json::json!({ "RestApiId": { "Ref": "<% api %>" } }),
        );

        let documents = vec![api, resource];
        let data = collect_exports(&documents).unwrap();
        assert_eq!(data.get("api"), Some(&Value::from("OrdersApi")));

        let stack = Stack::finalize(&documents, &data).unwrap();
        assert_eq!(
            serde_json::to_value(&stack).unwrap(),
            serde_json::json!({
                "Resources": {
                    "OrdersApi": {
                        "Type": "AWS::ApiGateway::Resource",
                        "Properties": { "Name": "orders" }
                    },
                    "OrdersResource": {
                        "Type": "AWS::ApiGateway::Resource",
                        "Properties": { "RestApiId": { "Ref": "OrdersApi" } }
                    }
                }
            })
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut first = document("list", serde_json::json!({}));
        first.with_origin("/a/list.form.hcl");
        let mut second = document("LIST", serde_json::json!({}));
        second.with_origin("/b/list.form.hcl");

        // canonical keys differ only by case are distinct
        assert!(Stack::finalize(&[first.clone(), second], &DataBag::new()).is_ok());

        let mut again = document("list", serde_json::json!({}));
        again.with_origin("/b/list.form.hcl");
        let error = Stack::finalize(&[first, again], &DataBag::new()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "document key List is defined twice (/a/list.form.hcl and /b/list.form.hcl)"
        );
    }

    #[test]
    fn conflicting_exports_are_rejected() {
        let mut one = document("one", serde_json::json!({}));
        one.export("shared");
        let mut two = document("two", serde_json::json!({}));
        two.export("shared");

        assert!(matches!(
            collect_exports(&[one.clone(), two]),
            Err(Error::DuplicateExport { .. })
        ));

        // the same export twice is fine
        assert!(collect_exports(&[one.clone(), one]).is_ok());
    }
}
