//! Error types for document import.

use thiserror::Error;

/// Why an import document was rejected. Rejection is all-or-nothing: no
/// entities are produced from a document that fails any of these checks.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    /// `data.configuration` is missing or not an object.
    #[error("Invalid design document: missing configuration block")]
    MissingConfiguration,

    /// `data.configuration.baseWidth` is missing or not a number.
    #[error("Invalid design document: configuration has no base width")]
    MissingBaseWidth,

    /// `data.visualElement` is missing or not an object.
    #[error("Invalid design document: missing root visual element")]
    MissingVisualElement,

    /// The configuration block has the wrong shape.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[source] serde_json::Error),

    /// An element in the tree has the wrong shape (e.g. no `widthSpec`).
    #[error("Invalid visual element: {0}")]
    InvalidElement(#[source] serde_json::Error),
}
