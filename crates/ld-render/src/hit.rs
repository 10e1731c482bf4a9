//! Hit testing: canvas point → entity lookup.
//!
//! Walks entities front-to-back (highest `z_order` first) and tests the
//! point against each entity's rotated rectangle.

use crate::surface::node_transform;
use kurbo::{Point, Rect};
use ld_core::id::EntityId;
use ld_core::model::Entity;

/// Whether `point` (canvas space) lies inside the entity's rotated box.
pub fn contains(entity: &Entity, point: Point) -> bool {
    let local = node_transform(entity.geometry(), entity.style.rotation).inverse() * point;
    Rect::new(0.0, 0.0, entity.width, entity.height)
        .abs()
        .contains(local)
}

/// Find the topmost entity at `point`. `skip` excludes one entity, e.g. the
/// one hidden under the text-edit overlay.
/// Returns `None` on empty background.
pub fn hit_test(entities: &[Entity], point: Point, skip: Option<EntityId>) -> Option<EntityId> {
    entities
        .iter()
        .filter(|e| Some(e.id) != skip)
        .filter(|e| contains(e, point))
        .max_by_key(|e| e.z_order)
        .map(|e| e.id)
}
