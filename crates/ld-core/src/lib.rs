pub mod document;
pub mod error;
pub mod export;
pub mod id;
pub mod import;
pub mod model;

pub use document::{Configuration, ElementType, ImportedDocument, VisualElement};
pub use error::ImportError;
pub use export::{ExportDocument, ModifiedElement, export_document};
pub use id::EntityId;
pub use import::flatten;
pub use model::*;
