//! Export of an editing session: the original document verbatim plus one
//! flat record per current entity.

use crate::document::ImportedDocument;
use crate::id::EntityId;
use crate::model::{Entity, EntityKind, Style};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub original_codia_data: Value,
    pub modified_elements: Vec<ModifiedElement>,
}

/// One exported entity. Style fields are spread at the top level; `text`
/// is present only for text entities (absent, not null, otherwise).
#[derive(Debug, Clone, Serialize)]
pub struct ModifiedElement {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&Entity> for ModifiedElement {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id,
            kind: e.kind(),
            x: e.x,
            y: e.y,
            width: e.width,
            height: e.height,
            style: e.style.clone(),
            text: e.text().map(str::to_owned),
        }
    }
}

/// Build the export for `document` with the current `entities`.
pub fn export_document(document: &ImportedDocument, entities: &[Entity]) -> ExportDocument {
    ExportDocument {
        original_codia_data: document.raw.clone(),
        modified_elements: entities.iter().map(ModifiedElement::from).collect(),
    }
}

impl ExportDocument {
    /// Pretty-printed JSON, two-space indented.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
