//! Error types for conf-render

use conf_model::Provenance;

/// Result type for conf-render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that fail one rendered output.
///
/// An error node anywhere under an output's addressed subtree is fatal for
/// that output only; sibling outputs are rendered independently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error at `{segment}` ({provenance}): {message}")]
    Subtree {
        segment: String,
        message: String,
        provenance: Provenance,
    },

    #[error("Unknown output format: {name}")]
    UnknownFormat { name: String },

    #[error("Output declares no format")]
    MissingFormat,

    #[error("Output declares no prefix")]
    MissingPrefix,

    #[error(transparent)]
    Engine(#[from] conf_engine::Error),

    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
