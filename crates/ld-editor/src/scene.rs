//! Scene model: the authoritative entity list plus the current selection.
//!
//! Every mutation is a [`SceneCommand`] value processed by
//! [`SceneModel::apply`], a plain reducer with no rendering side effects.
//! The editor reconciles the surface afterwards.

use ld_core::id::EntityId;
use ld_core::model::*;
use smallvec::SmallVec;

/// Offset applied to duplicated entities, in canvas units.
pub const DUPLICATE_NUDGE: f64 = 20.0;

/// A committed geometry change from a resize/rotate gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformUpdate {
    pub id: EntityId,
    pub geometry: Geometry,
    pub rotation: f64,
}

pub type IdList = SmallVec<[EntityId; 4]>;

/// A scene mutation. Gestures and toolbar commands are both expressed as
/// values of this type.
#[derive(Debug, Clone)]
pub enum SceneCommand {
    /// Replace every entity (document import) and clear the selection.
    ReplaceAll(Vec<Entity>),
    /// Apply a style patch; each entity takes the fields its kind accepts.
    SetStyle { ids: IdList, patch: StylePatch },
    Delete { ids: IdList },
    /// Copy entities, nudged and stacked on top; the copies become the
    /// selection.
    Duplicate { ids: IdList, stamp: u64 },
    SetGeometry { id: EntityId, geometry: Geometry },
    /// Committed drag: new top-left corners.
    Move { moves: Vec<(EntityId, f64, f64)> },
    /// Committed resize/rotate.
    Transform { updates: Vec<TransformUpdate> },
    SetText { id: EntityId, text: String },
    /// Append a user-created entity on top and select it.
    Add(Entity),
    /// Pointer click on `target` (`None` is empty background).
    Click { target: Option<EntityId>, additive: bool },
    SelectAll,
    ClearSelection,
}

#[derive(Debug, Default)]
pub struct SceneModel {
    entities: Vec<Entity>,
    selection: Vec<SelectionEntry>,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn selection(&self) -> &[SelectionEntry] {
        &self.selection
    }

    pub fn selected_ids(&self) -> IdList {
        self.selection.iter().map(|s| s.id).collect()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Highest `z_order` in use (0 when empty).
    pub fn max_z(&self) -> u32 {
        self.entities.iter().map(|e| e.z_order).max().unwrap_or(0)
    }

    /// Apply one command. Returns whether the entity list or the selection
    /// changed.
    pub fn apply(&mut self, command: SceneCommand) -> bool {
        let changed = match command {
            SceneCommand::ReplaceAll(entities) => {
                self.entities = entities;
                self.selection.clear();
                true
            }

            SceneCommand::SetStyle { ids, patch } => {
                let mut changed = false;
                for e in self.entities.iter_mut().filter(|e| ids.contains(&e.id)) {
                    let accepted = patch.accepted_by(e.kind());
                    if accepted.is_empty() {
                        continue;
                    }
                    let before = e.style.clone();
                    accepted.apply(&mut e.style);
                    changed |= e.style != before;
                }
                changed
            }

            SceneCommand::Delete { ids } => {
                let before = self.entities.len();
                self.entities.retain(|e| !ids.contains(&e.id));
                self.selection.retain(|s| !ids.contains(&s.id));
                self.entities.len() != before
            }

            SceneCommand::Duplicate { ids, stamp } => self.duplicate(&ids, stamp),

            SceneCommand::SetGeometry { id, geometry } => match self.get_mut(id) {
                Some(e) if e.geometry() != geometry => {
                    e.set_geometry(geometry);
                    true
                }
                _ => false,
            },

            SceneCommand::Move { moves } => {
                let mut changed = false;
                for (id, x, y) in moves {
                    if let Some(e) = self.get_mut(id)
                        && (e.x, e.y) != (x, y)
                    {
                        e.x = x;
                        e.y = y;
                        changed = true;
                    }
                }
                changed
            }

            SceneCommand::Transform { updates } => {
                let mut changed = false;
                for u in updates {
                    if let Some(e) = self.get_mut(u.id) {
                        changed |= e.geometry() != u.geometry || e.style.rotation != u.rotation;
                        e.set_geometry(u.geometry);
                        e.style.rotation = u.rotation;
                    }
                }
                changed
            }

            SceneCommand::SetText { id, text } => match self.get_mut(id).map(|e| &mut e.payload) {
                Some(EntityPayload::Text { text: current }) if *current != text => {
                    *current = text;
                    true
                }
                _ => false,
            },

            SceneCommand::Add(mut entity) => {
                entity.z_order = self.max_z() + 1;
                self.selection = vec![entity.selection_entry()];
                self.entities.push(entity);
                true
            }

            SceneCommand::Click { target, additive } => self.click(target, additive),

            SceneCommand::SelectAll => {
                let all: Vec<SelectionEntry> = self
                    .entities
                    .iter()
                    .filter(|e| e.draggable)
                    .map(Entity::selection_entry)
                    .collect();
                let changed = all != self.selection;
                self.selection = all;
                changed
            }

            SceneCommand::ClearSelection => {
                let changed = !self.selection.is_empty();
                self.selection.clear();
                changed
            }
        };

        if changed {
            self.refresh_selection();
        }
        changed
    }

    fn duplicate(&mut self, ids: &[EntityId], stamp: u64) -> bool {
        let max_z = self.max_z();
        let copies: Vec<Entity> = self
            .entities
            .iter()
            .filter(|e| ids.contains(&e.id))
            .enumerate()
            .map(|(index, e)| {
                let mut copy = e.clone();
                copy.id = EntityId::intern(&format!("{}_copy_{stamp}_{index}", e.id));
                copy.x += DUPLICATE_NUDGE;
                copy.y += DUPLICATE_NUDGE;
                copy.z_order = max_z + index as u32 + 1;
                copy
            })
            .collect();
        if copies.is_empty() {
            return false;
        }
        log::debug!("duplicated {} entities", copies.len());
        self.selection = copies.iter().map(Entity::selection_entry).collect();
        self.entities.extend(copies);
        true
    }

    fn click(&mut self, target: Option<EntityId>, additive: bool) -> bool {
        let selectable = target.filter(|id| self.get(*id).is_some_and(|e| e.draggable));
        let Some(id) = selectable else {
            let changed = !self.selection.is_empty();
            self.selection.clear();
            return changed;
        };

        if additive {
            if let Some(pos) = self.selection.iter().position(|s| s.id == id) {
                self.selection.remove(pos);
            } else if let Some(e) = self.get(id) {
                self.selection.push(e.selection_entry());
            }
            return true;
        }

        if self.selection.len() == 1 && self.selection[0].id == id {
            return false;
        }
        self.selection = self
            .get(id)
            .map(|e| vec![e.selection_entry()])
            .unwrap_or_default();
        true
    }

    /// Re-project selection entries from the current entities, dropping any
    /// whose entity is gone.
    fn refresh_selection(&mut self) {
        let entities = &self.entities;
        self.selection = self
            .selection
            .iter()
            .filter_map(|s| entities.iter().find(|e| e.id == s.id))
            .map(Entity::selection_entry)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn entity(id: &str, payload: EntityPayload, z: u32) -> Entity {
        let mut e = Entity::new(
            EntityId::intern(id),
            payload,
            Geometry {
                x: 10.0,
                y: 10.0,
                width: 100.0,
                height: 50.0,
            },
        );
        e.z_order = z;
        e
    }

    fn model() -> SceneModel {
        let mut locked = entity("bg", EntityPayload::Rect, 1);
        locked.draggable = false;
        let mut m = SceneModel::new();
        m.apply(SceneCommand::ReplaceAll(vec![
            locked,
            entity("title", EntityPayload::Text { text: "Hi".into() }, 2),
            entity("logo", EntityPayload::Image { url: None }, 4),
        ]));
        m
    }

    fn id(s: &str) -> EntityId {
        EntityId::intern(s)
    }

    #[test]
    fn style_fields_are_filtered_by_kind() {
        let mut m = model();
        let patch = StylePatch {
            font_size: Some(40.0),
            stroke_width: Some(3.0),
            fill: Some(Paint::Solid(Color::WHITE)),
            ..StylePatch::default()
        };
        assert!(m.apply(SceneCommand::SetStyle {
            ids: smallvec![id("title"), id("logo")],
            patch,
        }));

        let title = m.get(id("title")).unwrap();
        assert_eq!(title.style.font_size, Some(40.0));
        assert_eq!(title.style.stroke_width, None);
        assert_eq!(title.style.fill, Some(Paint::Solid(Color::WHITE)));

        let logo = m.get(id("logo")).unwrap();
        assert_eq!(logo.style.font_size, None);
        assert_eq!(logo.style.stroke_width, Some(3.0));
    }

    #[test]
    fn style_change_updates_selection_projection() {
        let mut m = model();
        m.apply(SceneCommand::Click {
            target: Some(id("title")),
            additive: false,
        });
        m.apply(SceneCommand::SetStyle {
            ids: m.selected_ids(),
            patch: StylePatch {
                opacity: Some(0.5),
                ..StylePatch::default()
            },
        });
        assert_eq!(m.selection()[0].style.opacity, 0.5);
    }

    #[test]
    fn numeric_style_values_pass_through() {
        let mut m = model();
        m.apply(SceneCommand::SetStyle {
            ids: smallvec![id("logo")],
            patch: StylePatch {
                opacity: Some(7.0),
                corner_radius: Some(-3.0),
                ..StylePatch::default()
            },
        });
        let logo = m.get(id("logo")).unwrap();
        assert_eq!(logo.style.opacity, 7.0);
        assert_eq!(logo.style.corner_radius, Some(-3.0));
    }

    #[test]
    fn delete_drops_selection_entries() {
        let mut m = model();
        m.apply(SceneCommand::SelectAll);
        assert_eq!(m.selection().len(), 2);
        assert!(m.apply(SceneCommand::Delete {
            ids: smallvec![id("title")],
        }));
        assert_eq!(m.entities().len(), 2);
        assert_eq!(m.selected_ids().as_slice(), &[id("logo")]);
        assert!(!m.apply(SceneCommand::Delete {
            ids: smallvec![id("title")],
        }));
    }

    #[test]
    fn duplicate_nudges_and_restacks() {
        let mut m = model();
        assert!(m.apply(SceneCommand::Duplicate {
            ids: smallvec![id("logo"), id("title")],
            stamp: 42,
        }));
        let ids: Vec<&str> = m.entities().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["bg", "title", "logo", "title_copy_42_0", "logo_copy_42_1"]
        );

        let copy = m.get(id("title_copy_42_0")).unwrap();
        assert_eq!((copy.x, copy.y), (30.0, 30.0));
        assert_eq!(copy.z_order, 5);
        assert_eq!(copy.text(), Some("Hi"));
        assert_eq!(m.get(id("logo_copy_42_1")).unwrap().z_order, 6);

        assert_eq!(
            m.selected_ids().as_slice(),
            &[id("title_copy_42_0"), id("logo_copy_42_1")]
        );
    }

    #[test]
    fn add_stacks_on_top_and_selects() {
        let mut m = model();
        m.apply(SceneCommand::Add(entity(
            "added",
            EntityPayload::Text { text: "x".into() },
            0,
        )));
        assert_eq!(m.get(id("added")).unwrap().z_order, 5);
        assert_eq!(m.selected_ids().as_slice(), &[id("added")]);
    }

    #[test]
    fn set_text_only_touches_text() {
        let mut m = model();
        assert!(m.apply(SceneCommand::SetText {
            id: id("title"),
            text: "Hello".into(),
        }));
        assert!(!m.apply(SceneCommand::SetText {
            id: id("title"),
            text: "Hello".into(),
        }));
        assert!(!m.apply(SceneCommand::SetText {
            id: id("logo"),
            text: "nope".into(),
        }));
    }

    #[test]
    fn transform_sets_geometry_and_rotation() {
        let mut m = model();
        let geometry = Geometry {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        assert!(m.apply(SceneCommand::Transform {
            updates: vec![TransformUpdate {
                id: id("logo"),
                geometry,
                rotation: 90.0,
            }],
        }));
        let logo = m.get(id("logo")).unwrap();
        assert_eq!(logo.geometry(), geometry);
        assert_eq!(logo.style.rotation, 90.0);
    }

    fn click(m: &mut SceneModel, target: &str, additive: bool) -> bool {
        m.apply(SceneCommand::Click {
            target: Some(id(target)),
            additive,
        })
    }

    #[test]
    fn reclicking_sole_selection_is_noop() {
        let mut m = model();
        assert!(click(&mut m, "title", false));
        assert!(!click(&mut m, "title", false));
        assert_eq!(m.selected_ids().as_slice(), &[id("title")]);
    }

    #[test]
    fn additive_click_on_sole_selection_empties_it() {
        let mut m = model();
        click(&mut m, "title", false);
        assert!(click(&mut m, "title", true));
        assert!(m.selection().is_empty());
    }

    #[test]
    fn plain_click_collapses_multi_selection() {
        let mut m = model();
        click(&mut m, "title", false);
        click(&mut m, "logo", true);
        assert_eq!(m.selected_ids().as_slice(), &[id("title"), id("logo")]);

        assert!(click(&mut m, "logo", false));
        assert_eq!(m.selected_ids().as_slice(), &[id("logo")]);
    }

    #[test]
    fn clicking_locked_entity_clears_selection() {
        let mut m = model();
        click(&mut m, "title", false);
        assert!(click(&mut m, "bg", true));
        assert!(m.selection().is_empty());
        assert!(!m.apply(SceneCommand::Click {
            target: None,
            additive: false,
        }));
    }
}
