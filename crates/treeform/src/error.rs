//! error taxonomy shared by all stages
use std::path::PathBuf;

/// Error produced by a generator or loader. Kept opaque so the original cause survives.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unable to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generator {} failed", path.display())]
    Generator {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("document key {key} is defined twice ({} and {})", display_origin(first), display_origin(second))]
    DuplicateKey {
        key: String,
        first: Option<PathBuf>,
        second: Option<PathBuf>,
    },

    #[error("export {name} refers to both {first} and {second}")]
    DuplicateExport {
        name: String,
        first: String,
        second: String,
    },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_origin(origin: &Option<PathBuf>) -> String {
    match origin {
        Some(path) => path.display().to_string(),
        None => "<unknown>".to_string(),
    }
}
