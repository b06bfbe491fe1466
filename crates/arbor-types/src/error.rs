//! Error types for the `arbor-types` crate.

/// Errors raised while constructing value types from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// A namespaced identifier could not be parsed.
    #[error("invalid identifier {raw:?}: {reason}")]
    InvalidIdentifier {
        /// The raw text that was rejected.
        raw: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
