//! Discovery errors.

use thiserror::Error;

/// Errors raised while building the type graph or walking it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// A type references an identifier the graph cannot resolve.
    #[error("Type '{from}' references unknown type '{to}'")]
    DanglingTypeReference { from: String, to: String },

    #[error("Unknown root type '{0}'")]
    UnknownRoot(String),

    #[error("Type '{0}' declared more than once")]
    DuplicateType(String),
}
