//! recursive directory walk
//!
//! Each directory is handled by one [TreeAssembler]:
//!
//! 1. list the directory (failure is fatal, nothing is returned)
//! 2. dispatch every entry concurrently
//!    - directories recurse into a child assembler with a derived [PathScope]
//!    - files matching a [Loaders] suffix are loaded and their generator is run
//!    - everything else is skipped
//! 3. concatenate the documents of all entries
//!
//! Entries are polled together on the current task, nothing is spawned. The first failing
//! entry fails the whole build and the remaining sibling futures are dropped. Entries are
//! sorted by file name before dispatch, so the output order is stable.
use crate::data_bag::DataBag;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::loader::Loaders;
use crate::scope::PathScope;
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, derive_new::new)]
pub struct TreeAssembler {
    scope: PathScope,
    data: Arc<DataBag>,
    #[new(default)]
    loaders: Arc<Loaders>,
}

impl TreeAssembler {
    pub fn with_loaders(mut self, loaders: Loaders) -> Self {
        self.loaders = Arc::new(loaders);
        self
    }

    pub fn scope(&self) -> &PathScope {
        &self.scope
    }

    /// Assemble every document below this scope
    pub fn build(&self) -> BoxFuture<'_, Result<Vec<Document>>> {
        async move {
            let directory = self.scope.absolute_path();
            tracing::info!(scope=%self.scope, path=%directory.display(), "listing directory");

            let entries = list_directory(&directory).await?;
            let per_entry = entries.into_iter().map(|name| self.dispatch(name));
            let documents: Vec<Document> = try_join_all(per_entry)
                .await?
                .into_iter()
                .flatten()
                .collect();

            tracing::debug!(scope=%self.scope, count = documents.len(), "directory assembled");
            Ok(documents)
        }
        .boxed()
    }

    async fn dispatch(&self, name: OsString) -> Result<Vec<Document>> {
        let path = self.scope.absolute_path().join(&name);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|source| Error::io(&path, source))?;

        if metadata.is_dir() {
            let Some(name) = name.to_str() else {
                return Err(Error::invalid(format!(
                    "directory name is not valid utf-8: {}",
                    path.display()
                )));
            };

            let child = Self {
                scope: self.scope.derive_child(name)?,
                data: Arc::clone(&self.data),
                loaders: Arc::clone(&self.loaders),
            };
            return child.build().await;
        }

        let Some(name) = name.to_str() else {
            tracing::warn!(path=%path.display(), "skipping file with non utf-8 name");
            return Ok(vec![]);
        };

        let Some(loader) = self.loaders.find(name) else {
            tracing::trace!(path=%path.display(), "skipping unrecognized entry");
            return Ok(vec![]);
        };

        let generated = async {
            let generator = loader.load(&path).await?;
            generator.generate(&self.scope, &self.data).await
        };
        let mut documents = generated.await.map_err(|source| Error::Generator {
            path: path.clone(),
            source,
        })?;

        for document in documents.iter_mut().filter(|d| d.origin().is_none()) {
            document.with_origin(&path);
        }

        tracing::debug!(path=%path.display(), count = documents.len(), "generator finished");
        Ok(documents)
    }
}

async fn list_directory(directory: &Path) -> Result<Vec<OsString>> {
    let io_error = |source| Error::io(directory, source);

    let mut read_dir = tokio::fs::read_dir(directory).await.map_err(io_error)?;
    let mut names = vec![];
    while let Some(entry) = read_dir.next_entry().await.map_err(io_error)? {
        names.push(entry.file_name());
    }

    names.sort();
    Ok(names)
}
