//! `*.form.json` and `*.form.yaml` generators
//!
//! The file holds one document or a list of them. These generators are static: the
//! same documents are produced wherever the file is found.
//!
//! ```yaml
//! - key: api
//!   type: AWS::ApiGateway::RestApi
//!   exports: [api]
//!   properties:
//!     Name: <% stage %>-orders
//! ```
use super::Loader;
use crate::document::Document;
use crate::error::BoxError;
use crate::generator::{Generator, GeneratorOutput};
use crate::value::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy)]
pub struct StructuredLoader {
    format: Format,
}

impl StructuredLoader {
    pub fn json() -> Self {
        Self {
            format: Format::Json,
        }
    }

    pub fn yaml() -> Self {
        Self {
            format: Format::Yaml,
        }
    }

    fn parse(&self, contents: &str) -> Result<OneOrMany, BoxError> {
        Ok(match self.format {
            Format::Json => serde_json::from_str(contents)?,
            Format::Yaml => serde_yaml::from_str(contents)?,
        })
    }
}

/// Serialized form of a [Document]
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentSpec {
    pub key: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub properties: serde_json::Value,
    #[serde(default)]
    pub exports: Vec<String>,
}

impl TryFrom<DocumentSpec> for Document {
    type Error = crate::Error;

    fn try_from(spec: DocumentSpec) -> Result<Self, Self::Error> {
        let mut document = Document::new(&spec.key, spec.resource_type, Value::from(spec.properties))?;
        for name in spec.exports {
            document.export(name);
        }
        Ok(document)
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(DocumentSpec),
    Many(Vec<DocumentSpec>),
}

#[async_trait::async_trait]
impl Loader for StructuredLoader {
    async fn load(&self, path: &Path) -> Result<Generator, BoxError> {
        tracing::info!(path=%path.display(), format=?self.format, "loading structured form");

        let file_contents = tokio::fs::read_to_string(path).await?;
        let output = match self.parse(&file_contents)? {
            OneOrMany::One(spec) => GeneratorOutput::One(spec.try_into()?),
            OneOrMany::Many(specs) => GeneratorOutput::Many(
                specs
                    .into_iter()
                    .map(Document::try_from)
                    .collect::<Result<_, _>>()?,
            ),
        };

        Ok(Generator::fixed(output))
    }
}
