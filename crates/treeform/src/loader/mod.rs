//! turning files into generators
//!
//! Which files are generators is decided by file name suffix. [Loaders] keeps the
//! registered suffixes in order and the first match wins.
mod hcl_form;
mod structured;

pub use hcl_form::HclLoader;
pub use structured::{DocumentSpec, StructuredLoader};

use crate::error::BoxError;
use crate::generator::Generator;
use std::path::Path;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Generator, BoxError>;
}

#[derive(Clone)]
pub struct Loaders {
    by_suffix: Vec<(String, Arc<dyn Loader>)>,
}

impl Loaders {
    /// No conventions at all; every file is skipped
    pub fn empty() -> Self {
        Self { by_suffix: vec![] }
    }

    pub fn register(&mut self, suffix: impl Into<String>, loader: Arc<dyn Loader>) -> &mut Self {
        self.by_suffix.push((suffix.into(), loader));
        self
    }

    pub fn find(&self, file_name: &str) -> Option<&Arc<dyn Loader>> {
        self.by_suffix
            .iter()
            .find(|(suffix, _)| file_name.ends_with(suffix.as_str()))
            .map(|(_, loader)| loader)
    }

    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.by_suffix.iter().map(|(suffix, _)| suffix.as_str())
    }
}

impl Default for Loaders {
    /// `*.form.hcl`, `*.form.json`, `*.form.yaml` and `*.form.yml`
    fn default() -> Self {
        let yaml: Arc<dyn Loader> = Arc::new(StructuredLoader::yaml());

        let mut loaders = Self::empty();
        loaders
            .register(".form.hcl", Arc::new(HclLoader))
            .register(".form.json", Arc::new(StructuredLoader::json()))
            .register(".form.yaml", yaml.clone())
            .register(".form.yml", yaml);
        loaders
    }
}

impl std::fmt::Debug for Loaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.suffixes()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_conventions() {
        let loaders = Loaders::default();
        assert!(loaders.find("list.form.hcl").is_some());
        assert!(loaders.find("list.form.json").is_some());
        assert!(loaders.find("list.form.yml").is_some());
        assert!(loaders.find("list.hcl").is_none());
        assert!(loaders.find("README.md").is_none());
    }

    #[test]
    fn first_match_wins() {
        struct Nothing;

        #[async_trait::async_trait]
        impl Loader for Nothing {
            async fn load(&self, _path: &Path) -> Result<Generator, BoxError> {
                Ok(Generator::fixed(Vec::<crate::document::Document>::new()))
            }
        }

        let nothing: Arc<dyn Loader> = Arc::new(Nothing);
        let mut loaders = Loaders::empty();
        loaders
            .register(".special.form.hcl", nothing.clone())
            .register(".form.hcl", Arc::new(HclLoader));

        let found = loaders.find("x.special.form.hcl").unwrap();
        assert!(Arc::ptr_eq(found, &nothing));
        assert_eq!(loaders.suffixes().collect::<Vec<_>>(), vec![".special.form.hcl", ".form.hcl"]);
    }
}
