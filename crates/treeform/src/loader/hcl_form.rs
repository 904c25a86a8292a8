//! `*.form.hcl` generators
//!
//! A form file is a list of `document` blocks. The document key is the block label, or the
//! `key` attribute when the key has to depend on the scope.
//!
//! ```hcl
//! document {
//!   key     = "${scope.token}_resource"
//!   type    = "AWS::ApiGateway::Resource"
//!   exports = ["${scope.token}_resource"]
//!
//!   properties = {
//!     PathPart  = scope.segment
//!     ParentId  = "<% ${scope.root_token}_root %>"
//!     RestApiId = { Ref = "<% api %>" }
//!   }
//! }
//! ```
//!
//! Expressions are evaluated with [hcl::eval] once per scope. Two variables are declared:
//!
//! | variable             | value                                            |
//! |----------------------|--------------------------------------------------|
//! | `scope.path`         | relative path, `/` separated                     |
//! | `scope.segment`      | directory name                                   |
//! | `scope.depth`        | number of segments                               |
//! | `scope.token`        | [PathScope::scoped_token] without suffix         |
//! | `scope.parent_token` | [PathScope::parent_scoped_token] or `null`       |
//! | `scope.root_token`   | [PathScope::root_scoped_token] without suffix    |
//! | `data.<name>`        | data bag entries                                 |
//!
//! `<% name %>` placeholders are plain text to hcl and survive until finalize.
use super::Loader;
use crate::data_bag::DataBag;
use crate::document::Document;
use crate::error::BoxError;
use crate::generator::Generator;
use crate::scope::PathScope;
use crate::value::Value;
use hcl::eval::Evaluate;
use std::path::Path;

const DOCUMENT_BLOCK: &str = "document";

#[derive(Debug, Clone, Copy, Default)]
pub struct HclLoader;

#[async_trait::async_trait]
impl Loader for HclLoader {
    async fn load(&self, path: &Path) -> Result<Generator, BoxError> {
        tracing::info!(path=%path.display(), "loading hcl form");

        let file_contents = tokio::fs::read_to_string(path).await?;
        let body: hcl::Body = hcl_edit::parser::parse_body(&file_contents)
            .map_err(FormError::HclParseFailed)?
            .into();

        Ok(Generator::callable(move |scope, data| {
            Ok(evaluate(&body, scope, data)?.into())
        }))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FormError {
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[source] hcl_edit::parser::Error),
    #[error("Unable to evaluate hcl expressions")]
    EvaluationFailed(#[from] hcl::eval::Error),
    #[error("Root attribute {0} is not allowed, wrap it in a document block")]
    RootAttribute(String),
    #[error("Unknown block type {0}, expected document")]
    UnknownBlockType(String),
    #[error("A document block takes at most one label")]
    DocumentLabel,
    #[error("Document {key}: {reason}")]
    InvalidDocument { key: String, reason: String },
    #[error(transparent)]
    Document(#[from] crate::Error),
}

fn evaluate(body: &hcl::Body, scope: &PathScope, data: &DataBag) -> Result<Vec<Document>, FormError> {
    let mut context = hcl::eval::Context::new();
    context.declare_var(hcl::Identifier::unchecked("scope"), scope_variable(scope));
    context.declare_var(hcl::Identifier::unchecked("data"), hcl::Value::from(data.clone()));

    let body = body.evaluate(&context)?;

    let mut documents = vec![];
    for structure in body {
        match structure {
            hcl::Structure::Attribute(attribute) => {
                return Err(FormError::RootAttribute(attribute.key.to_string()))
            }
            hcl::Structure::Block(block) if block.identifier.as_str() == DOCUMENT_BLOCK => {
                documents.push(document_from_block(block)?);
            }
            hcl::Structure::Block(block) => {
                return Err(FormError::UnknownBlockType(block.identifier.to_string()))
            }
        }
    }

    tracing::debug!(scope=%scope, count = documents.len(), "hcl form evaluated");
    Ok(documents)
}

fn document_from_block(block: hcl::Block) -> Result<Document, FormError> {
    let label = match block.labels.as_slice() {
        [] => None,
        [label] => Some(label.as_str().to_string()),
        _ => return Err(FormError::DocumentLabel),
    };
    let mut key = label.clone();
    let display_key = label.unwrap_or_else(|| "<unlabeled>".to_string());
    let invalid = |reason: String| FormError::InvalidDocument {
        key: display_key.clone(),
        reason,
    };

    let mut resource_type = None;
    let mut properties = Value::Null;
    let mut exports = vec![];

    for structure in block.body {
        let attribute = match structure {
            hcl::Structure::Attribute(attribute) => attribute,
            hcl::Structure::Block(nested) => {
                return Err(invalid(format!(
                    "nested block {} is not supported, use an attribute",
                    nested.identifier
                )))
            }
        };

        let value = Value::from(hcl::Value::from(attribute.expr));
        match attribute.key.as_str() {
            "type" => match value {
                Value::String(s) => resource_type = Some(s),
                other => return Err(invalid(format!("type must be a string, got {}", other.kind()))),
            },
            "key" if key.is_some() => {
                return Err(invalid("has both a label and a key attribute".to_string()))
            }
            "key" => match value {
                Value::String(s) => key = Some(s),
                other => return Err(invalid(format!("key must be a string, got {}", other.kind()))),
            },
            "properties" => properties = value,
            "exports" => match value {
                Value::Array(names) => {
                    for name in names {
                        match name {
                            Value::String(name) => exports.push(name),
                            other => {
                                return Err(invalid(format!(
                                    "exports must be strings, got {}",
                                    other.kind()
                                )))
                            }
                        }
                    }
                }
                other => return Err(invalid(format!("exports must be a list, got {}", other.kind()))),
            },
            other => return Err(invalid(format!("unknown attribute {other}"))),
        }
    }

    let Some(resource_type) = resource_type else {
        return Err(invalid("type is missing".to_string()));
    };
    let Some(key) = key else {
        return Err(invalid("needs a label or a key attribute".to_string()));
    };

    let mut document = Document::new(&key, resource_type, properties)?;
    for name in exports {
        document.export(name);
    }
    Ok(document)
}

fn scope_variable(scope: &PathScope) -> hcl::Value {
    let parent_token = scope
        .parent_scoped_token("")
        .map(Value::from)
        .unwrap_or_default();

    Value::from_iter([
        ("path", Value::from(scope.to_string())),
        ("segment", Value::from(scope.segment())),
        ("depth", Value::Integer(scope.depth() as i64)),
        ("token", Value::from(scope.scoped_token(""))),
        ("parent_token", parent_token),
        ("root_token", Value::from(scope.root_scoped_token(""))),
    ])
    .into()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn load(source: &str) -> Generator {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resource.form.hcl");
        std::fs::write(&path, source).unwrap();
        HclLoader.load(&path).await.expect("form must load")
    }

    const RESOURCE: &str = r#"
        document "resource" {
          type    = "AWS::ApiGateway::Resource"
          exports = ["${scope.token}_resource"]

          properties = {
            PathPart  = scope.segment
            Depth     = scope.depth
            ParentId  = "<% ${scope.root_token}_root %>"
            RestApiId = { Ref = "<% api %>" }
            Stage     = data.stage
          }
        }
    "#;

    #[tokio::test]
    async fn evaluates_against_scope() {
        let generator = load(RESOURCE).await;
        let scope = PathScope::new("/srv", "orders/{id}").unwrap();
        let data = DataBag::from_iter([("stage", "prod")]);

        let documents = generator.generate(&scope, &data).await.unwrap();
        assert_eq!(documents.len(), 1);

        let document = &documents[0];
        assert_eq!(document.key(), "Resource");
        assert_eq!(document.resource_type(), "AWS::ApiGateway::Resource");
        assert_eq!(
            document.properties(),
            &Value::from(serde_json::json!({
                "PathPart": "{id}",
                "Depth": 2,
                "ParentId": "<% orders_root %>",
                "RestApiId": { "Ref": "<% api %>" },
                "Stage": "prod"
            }))
        );
        assert_eq!(
            document.exports().get("orders_x7bidx7d_resource").map(String::as_str),
            Some("Resource")
        );
    }

    #[tokio::test]
    async fn parent_token_is_null_at_root_level() {
        let generator = load(
            r#"
            document "probe" {
              type       = "Probe"
              properties = { parent = scope.parent_token }
            }
            "#,
        )
        .await;

        let root_level = PathScope::new("/srv", "orders").unwrap();
        let documents = generator.generate(&root_level, &DataBag::new()).await.unwrap();
        assert_eq!(documents[0].property(&["parent"]), Some(&Value::Null));

        let nested = root_level.derive_child("item").unwrap();
        let documents = generator.generate(&nested, &DataBag::new()).await.unwrap();
        assert_eq!(documents[0].property(&["parent"]), Some(&Value::from("orders")));
    }

    #[tokio::test]
    async fn key_attribute_depends_on_scope() {
        let generator = load(
            r#"
            document {
              key  = "${scope.token}_get"
              type = "AWS::ApiGateway::Method"
            }
            "#,
        )
        .await;

        let orders = PathScope::new("/srv", "orders").unwrap();
        let item = orders.derive_child("item").unwrap();

        let mut keys = vec![];
        for scope in [orders, item] {
            let documents = generator.generate(&scope, &DataBag::new()).await.unwrap();
            keys.push(documents[0].key().to_string());
        }
        assert_eq!(keys, vec!["OrdersGet", "OrdersItemGet"]);
    }

    #[tokio::test]
    async fn label_and_key_attribute_conflict() {
        let generator = load(
            r#"
            document "get" {
              key  = "${scope.token}_get"
              type = "AWS::ApiGateway::Method"
            }
            "#,
        )
        .await;

        let scope = PathScope::new("/srv", "orders").unwrap();
        let error = generator
            .generate(&scope, &DataBag::new())
            .await
            .expect_err("label and key must not both be set");
        let error = error.downcast_ref::<FormError>().expect("form error");
        assert!(
            matches!(error, FormError::InvalidDocument { key, .. } if key == "get"),
            "{error:?}"
        );
    }

    #[tokio::test]
    async fn several_documents() {
        let generator = load(
            r#"
            document "get" { type = "Method" }
            document "post" { type = "Method" }
            "#,
        )
        .await;

        let scope = PathScope::new("/srv", "orders").unwrap();
        let documents = generator.generate(&scope, &DataBag::new()).await.unwrap();
        let keys: Vec<_> = documents.iter().map(Document::key).collect();
        assert_eq!(keys, vec!["Get", "Post"]);
    }

    #[tokio::test]
    async fn rejects_unexpected_structures() {
        let scope = PathScope::new("/srv", "orders").unwrap();

        for source in [
            "stray = 1",
            "resource \"x\" { type = \"T\" }",
            "document { type = \"T\" }",
            "document \"x\" \"y\" { type = \"T\" }",
            "document \"x\" { properties = {} }",
            "document \"x\" {\n  type = \"T\"\n  color = \"red\"\n}",
            "document \"x\" { type = data.missing }",
        ] {
            let generator = load(source).await;
            assert!(
                generator.generate(&scope, &DataBag::new()).await.is_err(),
                "{source}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_variables_fail_evaluation() {
        let generator = load("document \"x\" { type = data.missing }").await;
        let scope = PathScope::new("/srv", "orders").unwrap();

        let error = generator
            .generate(&scope, &DataBag::new())
            .await
            .expect_err("data.missing is not declared");
        assert!(
            matches!(
                error.downcast_ref::<FormError>(),
                Some(FormError::EvaluationFailed(_))
            ),
            "{error:?}"
        );
    }

    #[tokio::test]
    async fn parse_errors_fail_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.form.hcl");
        std::fs::write(&path, "not = valid = hcl").unwrap();

        let error = HclLoader.load(&path).await.expect_err("must fail");
        assert!(error.downcast_ref::<FormError>().is_some());
    }
}
