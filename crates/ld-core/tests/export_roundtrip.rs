//! Integration tests: import → edit → export → re-import.
//!
//! The export must carry the untouched input alongside the edited entities,
//! so a session can always be replayed from its own output.

use ld_core::model::*;
use ld_core::{EntityId, ImportedDocument, export_document, flatten};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const SAMPLE: &str = include_str!("fixtures/sample.json");

fn sample() -> (ImportedDocument, Vec<Entity>) {
    let doc = ImportedDocument::parse(SAMPLE).expect("sample should parse");
    let entities = flatten(&doc.root);
    (doc, entities)
}

#[test]
fn original_data_survives_verbatim() {
    let (doc, entities) = sample();
    let exported = export_document(&doc, &entities);
    let json = exported.to_json().expect("export serializes");

    let value: Value = serde_json::from_str(&json).unwrap();
    let original: Value = serde_json::from_str(SAMPLE).unwrap();
    assert_eq!(value["originalCodiaData"], original);
}

#[test]
fn reimporting_the_original_yields_the_same_entities() {
    let (doc, entities) = sample();
    let exported = export_document(&doc, &entities);
    let json = exported.to_json().unwrap();

    let value: Value = serde_json::from_str(&json).unwrap();
    let again = ImportedDocument::from_value(value["originalCodiaData"].clone()).unwrap();
    assert_eq!(flatten(&again.root), entities);
    assert_eq!(again.canvas_size(), (1440.0, 960.0));
}

#[test]
fn modified_elements_reflect_edits() {
    let (doc, mut entities) = sample();
    let title = EntityId::intern("text-title");
    let entity = entities.iter_mut().find(|e| e.id == title).unwrap();
    entity.x = 10.0;
    entity.style.font_size = Some(42.0);
    entity.style.rotation = 15.0;
    if let EntityPayload::Text { text } = &mut entity.payload {
        *text = "EDITED".into();
    }

    let value = serde_json::to_value(export_document(&doc, &entities)).unwrap();
    let elements = value["modifiedElements"].as_array().unwrap();
    assert_eq!(elements.len(), entities.len());

    let record = elements.iter().find(|e| e["id"] == json!("text-title")).unwrap();
    assert_eq!(record["type"], json!("Text"));
    assert_eq!(record["x"], json!(10.0));
    assert_eq!(record["fontSize"], json!(42.0));
    assert_eq!(record["rotation"], json!(15.0));
    assert_eq!(record["text"], json!("EDITED"));
    assert_eq!(record["fill"], json!("#ffffff"));
    assert_eq!(record["align"], json!("center"));

    let overlay = elements.iter().find(|e| e["id"] == json!("rect-overlay")).unwrap();
    assert_eq!(overlay["type"], json!("Rect"));
    assert!(overlay.get("text").is_none());
    assert_eq!(overlay["fill"], json!("#000000"));
}

#[test]
fn export_is_ordered_like_the_entity_list() {
    let (doc, entities) = sample();
    let value = serde_json::to_value(export_document(&doc, &entities)).unwrap();
    let ids: Vec<&str> = value["modifiedElements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "img-background",
            "text-title",
            "text-subtitle",
            "img-logo-1",
            "img-logo-2",
            "rect-overlay",
        ]
    );
}
