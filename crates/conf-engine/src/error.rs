//! Error types for conf-engine

use conf_model::QualifiedName;

/// Result type for conf-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in conf-engine operations.
///
/// Localized resolution failures (unsupported substitutes, missing or cyclic
/// references) are captured as tree data, not as `Err`; these variants cover
/// only misuse of the engine's own APIs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Pattern already registered: {name}")]
    DuplicatePattern { name: QualifiedName },

    #[error("No subtree matches prefix: {prefix}")]
    NoSuchPrefix { prefix: QualifiedName },
}
