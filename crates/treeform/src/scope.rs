//! position of a directory inside the source tree
//!
//! A [PathScope] only knows the tree root and its own relative path. Everything that
//! refers to the parent or the root-level directory is computed from the path segments,
//! so scopes never point at each other.
//!
//! | relative path  | `scoped_token("RES")` | `parent_scoped_token("RES")` | `root_scoped_token("API")` |
//! |----------------|-----------------------|------------------------------|----------------------------|
//! | `orders`       | `orders_RES`          | -                            | `orders_API`               |
//! | `orders/item`  | `orders_item_RES`     | `orders_RES`                 | `orders_API`               |
//! | `orders/{id}`  | `orders_x7bidx7d_RES` | `orders_RES`                 | `orders_API`               |
//!
//! Segments are escaped (see [identifier_segment]), so for a given suffix two different scopes
//! never share a token.
use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Joins identifier segments. Never part of an identifier segment (see [identifier_segment]).
pub const SEPARATOR: &str = "_";

const ESCAPE: char = 'x';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathScope {
    root: PathBuf,
    relative_path: PathBuf,
    path_tokens: Vec<String>,
}

impl PathScope {
    pub fn new(root: impl AsRef<Path>, relative_path: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(Error::invalid("root path must not be empty"));
        }

        let root = std::path::absolute(root)
            .map_err(|e| Error::invalid(format!("unable to resolve {}: {e}", root.display())))?;

        let path_tokens = split_relative(relative_path.as_ref())?;
        if path_tokens.is_empty() {
            return Err(Error::invalid("relative path must not be empty"));
        }

        Ok(Self {
            root,
            relative_path: path_tokens.iter().collect(),
            path_tokens,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Raw path segments, root-level segment first
    pub fn path_tokens(&self) -> &[String] {
        &self.path_tokens
    }

    /// Name of the directory this scope represents
    pub fn segment(&self) -> &str {
        self.path_tokens
            .last()
            .expect("a scope always has at least one segment")
    }

    pub fn depth(&self) -> usize {
        self.path_tokens.len()
    }

    pub fn absolute_path(&self) -> PathBuf {
        self.root.join(&self.relative_path)
    }

    pub fn resolve_file(&self, name: &str) -> Result<PathBuf> {
        let name = single_segment(name, "file name")?;
        Ok(self.absolute_path().join(name))
    }

    /// Token unique across the whole tree: every segment from the root down to this scope
    pub fn scoped_token(&self, suffix: &str) -> String {
        join_token(&self.path_tokens, suffix)
    }

    /// Token of the enclosing directory, `None` when the parent is the tree root itself
    pub fn parent_scoped_token(&self, suffix: &str) -> Option<String> {
        match self.path_tokens.split_last() {
            Some((_, parent)) if !parent.is_empty() => Some(join_token(parent, suffix)),
            _ => None,
        }
    }

    /// Token of the root-level directory, independent of the current depth
    pub fn root_scoped_token(&self, suffix: &str) -> String {
        join_token(&self.path_tokens[..1], suffix)
    }

    pub fn derive_child(&self, segment: &str) -> Result<Self> {
        let segment = single_segment(segment, "child segment")?;

        let mut path_tokens = self.path_tokens.clone();
        path_tokens.push(segment.to_string());

        Ok(Self {
            root: self.root.clone(),
            relative_path: self.relative_path.join(segment),
            path_tokens,
        })
    }
}

impl std::fmt::Display for PathScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path_tokens.join("/"))
    }
}

/// Identifier form of a path segment
///
/// Lowercase ASCII letters and digits are kept, every other byte is written as `x` and two
/// lowercase hex digits. A leading digit is escaped as well, and so is a literal `x` followed
/// by two hex digits. The mapping is one-to-one and the result always starts with a lowercase
/// letter and holds no uppercase letter, which keeps segment boundaries visible after
/// [crate::document::canonical_key].
///
/// `user_list` becomes `userx5flist`, `{id}` becomes `x7bidx7d`, `Orders` becomes `x4frders`.
pub fn identifier_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut identifier = String::with_capacity(bytes.len());

    for (index, &byte) in bytes.iter().enumerate() {
        let keep = match byte {
            b'x' => !starts_with_hex_pair(&bytes[index + 1..]),
            b'a'..=b'z' => true,
            b'0'..=b'9' => index > 0,
            _ => false,
        };

        if keep {
            identifier.push(byte as char);
        } else {
            identifier.push(ESCAPE);
            identifier.push_str(&format!("{byte:02x}"));
        }
    }

    identifier
}

fn starts_with_hex_pair(bytes: &[u8]) -> bool {
    let is_hex = |byte: &u8| matches!(byte, b'0'..=b'9' | b'a'..=b'f');
    matches!(bytes, [first, second, ..] if is_hex(first) && is_hex(second))
}

fn join_token(segments: &[String], suffix: &str) -> String {
    let mut parts: Vec<String> = segments.iter().map(|s| identifier_segment(s)).collect();
    if !suffix.is_empty() {
        parts.push(suffix.to_string());
    }
    parts.join(SEPARATOR)
}

fn split_relative(relative_path: &Path) -> Result<Vec<String>> {
    let mut tokens = vec![];
    for component in relative_path.components() {
        match component {
            Component::Normal(segment) => {
                let Some(segment) = segment.to_str() else {
                    return Err(Error::invalid(format!(
                        "path segment is not valid utf-8: {}",
                        relative_path.display()
                    )));
                };
                tokens.push(segment.to_string());
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::invalid(format!(
                    "relative path must stay below the root: {}",
                    relative_path.display()
                )));
            }
        }
    }
    Ok(tokens)
}

fn single_segment<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::invalid(format!("{what} must not be empty")));
    }

    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(value),
        _ => Err(Error::invalid(format!(
            "{what} must be a single path segment: {value}"
        ))),
    }
}
