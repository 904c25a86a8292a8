//! Builds small trees on disk with the default loaders

use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use treeform::{DataBag, Document, Error, PathScope, Stack, TreeAssembler, Value};

const LIST: &str = r#"
document "list" {
  type       = "Resource"
  properties = { PathPart = scope.segment }
}
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

async fn build(root: &Path, relative: &str) -> treeform::Result<Vec<Document>> {
    let scope = PathScope::new(root, relative)?;
    TreeAssembler::new(scope, Arc::new(DataBag::new())).build().await
}

#[tokio::test]
async fn empty_directory_builds_nothing() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("orders")).unwrap();

    assert!(build(root.path(), "orders").await.unwrap().is_empty());
}

#[tokio::test]
async fn one_generator_one_document() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "orders/list.form.hcl", LIST);

    let documents = build(root.path(), "orders").await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].key(), "List");
    assert_eq!(documents[0].resource_type(), "Resource");
    assert_eq!(
        documents[0].property(&["PathPart"]),
        Some(&Value::from("orders"))
    );
}

#[tokio::test]
async fn nested_generator_is_collected() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "orders/item/list.form.hcl", LIST);

    let documents = build(root.path(), "orders").await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(
        documents[0].property(&["PathPart"]),
        Some(&Value::from("item"))
    );
}

#[tokio::test]
async fn mixed_formats() {
    let root = tempfile::tempdir().unwrap();
    write(
        root.path(),
        "api/api.form.json",
        r#"[{"key": "api", "type": "RestApi"}, {"key": "deployment", "type": "Deployment"}]"#,
    );
    write(root.path(), "api/models.form.yml", "key: model\ntype: Model\n");
    write(root.path(), "api/orders/list.form.hcl", LIST);
    write(root.path(), "api/orders/notes.txt", "ignored");

    let documents = build(root.path(), "api").await.unwrap();
    let keys: Vec<_> = documents.iter().map(Document::key).collect();
    assert_eq!(keys, vec!["Api", "Deployment", "Model", "List"]);
}

#[tokio::test]
async fn similar_sibling_names_keep_distinct_keys() {
    const SCOPED: &str = r#"
document {
  key  = "${scope.token}_list"
  type = "Resource"
}
"#;

    let root = tempfile::tempdir().unwrap();
    for sibling in ["user_list", "userlist", "user-list", "userList"] {
        write(root.path(), &format!("shop/{sibling}/list.form.hcl"), SCOPED);
    }

    let documents = build(root.path(), "shop").await.unwrap();
    let stack = Stack::finalize(&documents, &DataBag::new()).unwrap();

    let keys: Vec<_> = stack.resources.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "ShopUserx2dlistList",
            "ShopUserx4cistList",
            "ShopUserx5flistList",
            "ShopUserlistList",
        ]
    );
}

#[tokio::test]
async fn failing_generator_yields_no_documents() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "orders/list.form.hcl", LIST);
    write(root.path(), "orders/item/broken.form.hcl", "document \"x\" {");

    let error = build(root.path(), "orders").await.unwrap_err();
    match &error {
        Error::Generator { path, .. } => assert!(path.ends_with("item/broken.form.hcl")),
        other => panic!("expected generator error, got {other:?}"),
    }
    // the original cause is reachable
    assert!(std::error::Error::source(&error).is_some());
}

#[tokio::test]
async fn missing_root_is_io_error() {
    let root = tempfile::tempdir().unwrap();
    assert!(matches!(
        build(root.path(), "nowhere").await,
        Err(Error::Io { .. })
    ));
}

#[test]
fn scope_scenarios() {
    let orders = PathScope::new("/srv", "orders").unwrap();
    assert_eq!(orders.scoped_token("RES"), "orders_RES");
    assert_eq!(orders.parent_scoped_token("RES"), None);

    let item = PathScope::new("/srv", "orders/item").unwrap();
    assert_eq!(item.scoped_token("RES"), "orders_item_RES");
    assert_eq!(item.parent_scoped_token("RES").as_deref(), Some("orders_RES"));
    assert_eq!(item.root_scoped_token("API"), "orders_API");
    assert_eq!(orders.derive_child("item").unwrap(), item);
}
