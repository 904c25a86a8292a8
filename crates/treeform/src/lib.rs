//! # treeform - infrastructure documents from a directory tree
//!
//! ## Introduction for developers
//!
//! Read this to understand how `treeform` works internally.
//!
//! ### Directories are namespaces
//!
//! The source tree mirrors the structure of the output. Every directory is represented by a
//! [scope::PathScope] which is derived from the tree root and a relative path. A scope can
//! produce identifiers that are unique in the whole tree without knowing about any other
//! directory. Characters that cannot appear in an identifier are escaped, never dropped:
//!
//! ```text
//! api/                      scope "api"          token api
//! ├── api.form.yaml
//! └── orders/               scope "api/orders"   token api_orders      parent api
//!     ├── resource.form.hcl
//!     └── {id}/             scope "api/orders/{id}"  token api_orders_x7bidx7d  parent api_orders
//!         └── get.form.hcl
//! ```
//!
//! ### Assembling
//!
//! [assembler::TreeAssembler] walks the tree. Files whose name matches a registered suffix
//! (see [loader::Loaders]) are turned into a [generator::Generator] by a [loader::Loader].
//! A generator is either static or a function of the scope and the data bag, and it produces
//! any number of [document::Document]s. All documents of the tree end up in one list.
//!
//! A single failing directory listing, stat or generator fails the whole build.
//!
//! ### Finalizing
//!
//! Documents reference each other through `<% name %>` placeholders which are kept verbatim
//! while assembling. Once everything is collected, [stack::collect_exports] provides the
//! names documents exported and [document::Document::finalize] substitutes the placeholders
//! against a [data_bag::DataBag]. [stack::Stack] keys the finalized documents by their
//! canonical key.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use treeform::{collect_exports, DataBag, PathScope, Stack, TreeAssembler};
//!
//! let scope = PathScope::new("templates", "api")?;
//! let data = Arc::new(DataBag::from_iter([("stage", "prod")]));
//! let documents = TreeAssembler::new(scope, data.clone()).build().await?;
//!
//! let mut bag = (*data).clone();
//! bag.merge_missing(collect_exports(&documents)?);
//! let stack = Stack::finalize(&documents, &bag)?;
//! println!("{}", serde_json::to_string_pretty(&stack)?);
//! # Ok(())
//! # }
//! ```
pub mod assembler;
pub mod data_bag;
pub mod document;
mod error;
pub mod generator;
pub mod interpolate;
pub mod loader;
pub mod scope;
pub mod stack;
pub mod value;

pub use assembler::TreeAssembler;
pub use data_bag::DataBag;
pub use document::{Document, FinalizedDocument};
pub use error::{BoxError, Error, Result};
pub use scope::PathScope;
pub use stack::{collect_exports, Stack};
pub use value::Value;
