//! generator contract
//!
//! A generator is whatever a [Loader](crate::loader::Loader) made out of a file. It either
//! holds its documents already ([Generator::Static]) or computes them from the scope and
//! data bag ([Generator::Callable]), immediately or as a future. [Generator::generate] turns
//! every shape into a plain list.
use crate::data_bag::DataBag;
use crate::document::Document;
use crate::error::BoxError;
use crate::scope::PathScope;
use futures::future::BoxFuture;
use std::sync::Arc;

pub type GenerateFn =
    dyn Fn(&PathScope, &DataBag) -> Result<Generated, BoxError> + Send + Sync + 'static;

#[derive(Debug)]
pub enum GeneratorOutput {
    One(Document),
    Many(Vec<Document>),
}

impl GeneratorOutput {
    pub fn into_vec(self) -> Vec<Document> {
        match self {
            GeneratorOutput::One(document) => vec![document],
            GeneratorOutput::Many(documents) => documents,
        }
    }
}

impl From<Document> for GeneratorOutput {
    fn from(value: Document) -> Self {
        GeneratorOutput::One(value)
    }
}

impl From<Vec<Document>> for GeneratorOutput {
    fn from(value: Vec<Document>) -> Self {
        GeneratorOutput::Many(value)
    }
}

/// Result of calling a [Generator::Callable]
pub enum Generated {
    Ready(GeneratorOutput),
    Pending(BoxFuture<'static, Result<GeneratorOutput, BoxError>>),
}

impl From<GeneratorOutput> for Generated {
    fn from(value: GeneratorOutput) -> Self {
        Generated::Ready(value)
    }
}

impl From<Document> for Generated {
    fn from(value: Document) -> Self {
        Generated::Ready(value.into())
    }
}

impl From<Vec<Document>> for Generated {
    fn from(value: Vec<Document>) -> Self {
        Generated::Ready(value.into())
    }
}

#[derive(Clone)]
pub enum Generator {
    Static(Arc<GeneratorOutput>),
    Callable(Arc<GenerateFn>),
}

impl Generator {
    pub fn fixed(output: impl Into<GeneratorOutput>) -> Self {
        Generator::Static(Arc::new(output.into()))
    }

    pub fn callable<F>(generate: F) -> Self
    where
        F: Fn(&PathScope, &DataBag) -> Result<Generated, BoxError> + Send + Sync + 'static,
    {
        Generator::Callable(Arc::new(generate))
    }

    /// Produce the documents for `scope`
    ///
    /// Static documents are cloned, so a generator can be reused for several scopes.
    pub async fn generate(
        &self,
        scope: &PathScope,
        data: &DataBag,
    ) -> Result<Vec<Document>, BoxError> {
        let output = match self {
            Generator::Static(output) => match output.as_ref() {
                GeneratorOutput::One(document) => GeneratorOutput::One(document.clone()),
                GeneratorOutput::Many(documents) => GeneratorOutput::Many(documents.clone()),
            },
            Generator::Callable(generate) => match generate(scope, data)? {
                Generated::Ready(output) => output,
                Generated::Pending(pending) => pending.await?,
            },
        };

        Ok(output.into_vec())
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::Static(output) => f.debug_tuple("Static").field(output).finish(),
            Generator::Callable(_) => f.write_str("Callable"),
        }
    }
}
