//! Namespaced identifiers (`namespace:path`) for blocks and items.
//!
//! The host addresses every registry entry through an identifier of this
//! shape. A bare path parses into the default `minecraft` namespace.
//! Namespaces allow `[a-z0-9_.-]`; paths additionally allow `/`.

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Namespace applied when the raw text has no `:` separator.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A validated `namespace:path` identifier.
///
/// Stored as the full canonical string so it can be compared, hashed,
/// ordered, and serialized without re-assembly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse an identifier, applying the default namespace to bare paths.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidIdentifier`] if either part is empty or
    /// contains characters outside the allowed set.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let (namespace, path) = raw.split_once(':').unwrap_or((DEFAULT_NAMESPACE, raw));

        if namespace.is_empty() {
            return Err(invalid(raw, "empty namespace"));
        }
        if path.is_empty() {
            return Err(invalid(raw, "empty path"));
        }
        if !namespace.chars().all(is_namespace_char) {
            return Err(invalid(raw, "illegal character in namespace"));
        }
        if !path.chars().all(is_path_char) {
            return Err(invalid(raw, "illegal character in path"));
        }

        Ok(Self(format!("{namespace}:{path}")))
    }

    /// Build an identifier in the default namespace.
    ///
    /// Intended for compile-time-known vanilla paths. The path is not
    /// re-validated; callers pass literals.
    pub fn vanilla(path: &str) -> Self {
        Self(format!("{DEFAULT_NAMESPACE}:{path}"))
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or(DEFAULT_NAMESPACE, |(ns, _)| ns)
    }

    /// The path part.
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }

    /// The full `namespace:path` text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(raw: &str, reason: &'static str) -> TypesError {
    TypesError::InvalidIdentifier {
        raw: raw.to_owned(),
        reason,
    }
}

const fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

const fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl core::fmt::Display for Identifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = TypesError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}
