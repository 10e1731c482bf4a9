//! The editor context: one owned bundle of scene, surface, reconciler,
//! viewport, select tool and text-edit overlay.
//!
//! Every public command mutates the scene through a [`SceneCommand`] and
//! then calls `sync`, which reconciles the surface, refreshes the handles
//! and pushes the stage transform. Several editors can coexist; nothing is
//! global except the id interner.

use crate::input::InputEvent;
use crate::scene::{IdList, SceneCommand, SceneModel};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::text_edit::{EditOutcome, TextEditSession, TextOverlay};
use crate::tools::{SelectTool, ToolAction, ToolContext};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use ld_core::id::{EntityId, next_stamp};
use ld_core::model::*;
use ld_core::{ExportDocument, ImportError, ImportedDocument, export_document, flatten};
use ld_render::handles::HandleBox;
use ld_render::image::{Bitmap, prepare_upload};
use ld_render::{RenderError, RenderSurface, Reconciler, hit_test};

/// Size of a freshly added text box.
pub const NEW_TEXT_SIZE: Size = Size::new(200.0, 50.0);
pub const NEW_TEXT_CONTENT: &str = "Double-click to edit";
const NEW_TEXT_FONT: &str = "Inter, sans-serif";
const NEW_TEXT_FONT_SIZE: f64 = 24.0;

pub struct Editor<S: RenderSurface> {
    surface: S,
    scene: SceneModel,
    reconciler: Reconciler,
    viewport: Viewport,
    tool: SelectTool,
    text_edit: TextEditSession,
    document: Option<ImportedDocument>,
    canvas_size: Size,
}

impl<S: RenderSurface> Editor<S> {
    /// Create an editor drawing into `surface`, shown in a container of
    /// `container` screen pixels.
    pub fn new(surface: S, container: Size) -> Self {
        let mut editor = Self {
            surface,
            scene: SceneModel::new(),
            reconciler: Reconciler::new(),
            viewport: Viewport::new(container),
            tool: SelectTool::new(),
            text_edit: TextEditSession::default(),
            document: None,
            canvas_size: Size::ZERO,
        };
        editor.sync();
        editor
    }

    // ─── Observable state ───────────────────────────────────────────────

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn entities(&self) -> &[Entity] {
        self.scene.entities()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    pub fn selection(&self) -> &[SelectionEntry] {
        self.scene.selection()
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn pan(&self) -> Vec2 {
        self.viewport.pan()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Canvas base size of the imported document (zero before import).
    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn overlay(&self) -> Option<&TextOverlay> {
        self.text_edit.overlay()
    }

    pub fn document(&self) -> Option<&ImportedDocument> {
        self.document.as_ref()
    }

    /// Current handle box around the selected draggable entities.
    pub fn handle_box(&self) -> Option<HandleBox> {
        if self.text_edit.overlay().is_some() {
            return None;
        }
        HandleBox::around(
            self.handle_ids()
                .iter()
                .filter_map(|id| self.scene.get(*id))
                .map(|e| (e.geometry(), e.style.rotation)),
        )
    }

    // ─── Commands ───────────────────────────────────────────────────────

    /// Replace the scene with an import document. On error nothing changes.
    pub fn import_document(&mut self, text: &str) -> Result<(), ImportError> {
        let document = ImportedDocument::parse(text)?;
        let entities = flatten(&document.root);
        log::debug!("imported {} entities", entities.len());

        self.text_edit.cancel();
        self.tool.reset();
        let (w, h) = document.canvas_size();
        self.canvas_size = Size::new(w, h);
        self.viewport.fit(self.canvas_size);
        self.document = Some(document);
        self.scene.apply(SceneCommand::ReplaceAll(entities));
        self.sync();
        Ok(())
    }

    /// Add a text box in the middle of the canvas and select it.
    pub fn add_text(&mut self) -> EntityId {
        self.finish_edit();
        let id = EntityId::stamped("text");
        let mut entity = Entity::new(
            id,
            EntityPayload::Text {
                text: NEW_TEXT_CONTENT.to_owned(),
            },
            self.centered(NEW_TEXT_SIZE),
        );
        entity.style = Style {
            fill: Some(Paint::Solid(Color::BLACK)),
            font_family: Some(NEW_TEXT_FONT.to_owned()),
            font_size: Some(NEW_TEXT_FONT_SIZE),
            font_style: Some(FontStyle::Normal),
            font_weight: Some(400),
            text_decoration: Some(String::new()),
            align: Some(TextAlign::Center),
            background_color: Some(Paint::Transparent),
            ..Style::default()
        };
        self.scene.apply(SceneCommand::Add(entity));
        self.sync();
        id
    }

    /// Add an uploaded PNG, JPEG or GIF in the middle of the canvas and
    /// select it. Large images are downscaled first.
    pub fn add_image(&mut self, data: &[u8]) -> Result<EntityId, RenderError> {
        let prepared = prepare_upload(data)?;
        self.finish_edit();

        let id = EntityId::stamped("image");
        let size = Size::new(prepared.bitmap.width as f64, prepared.bitmap.height as f64);
        let entity = Entity::new(
            id,
            EntityPayload::Image {
                url: Some(prepared.data_uri.clone()),
            },
            self.centered(size),
        );
        self.reconciler.preseed(&prepared.data_uri, prepared.bitmap);
        self.scene.apply(SceneCommand::Add(entity));
        self.sync();
        Ok(id)
    }

    /// Apply a style patch to every selected entity.
    pub fn set_style(&mut self, patch: StylePatch) -> bool {
        let ids = self.scene.selected_ids();
        self.run(SceneCommand::SetStyle { ids, patch })
    }

    pub fn delete_selection(&mut self) -> bool {
        let ids = self.scene.selected_ids();
        if ids.is_empty() {
            return false;
        }
        self.run(SceneCommand::Delete { ids })
    }

    pub fn duplicate_selection(&mut self) -> bool {
        let ids = self.scene.selected_ids();
        if ids.is_empty() {
            return false;
        }
        self.run(SceneCommand::Duplicate {
            ids,
            stamp: next_stamp(),
        })
    }

    pub fn select_all(&mut self) -> bool {
        self.run(SceneCommand::SelectAll)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.run(SceneCommand::ClearSelection)
    }

    /// Set the geometry of one entity, as from a property panel.
    pub fn set_geometry(&mut self, id: EntityId, geometry: Geometry) -> bool {
        self.run(SceneCommand::SetGeometry { id, geometry })
    }

    /// Zoom to `level` (clamped) about the container center.
    pub fn set_zoom(&mut self, level: f64) -> bool {
        let changed = self.viewport.set_zoom(level);
        if changed {
            self.sync();
        }
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_in();
        if changed {
            self.sync();
        }
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_out();
        if changed {
            self.sync();
        }
        changed
    }

    pub fn set_container(&mut self, container: Size) {
        self.viewport.set_container(container);
        self.sync();
    }

    /// Feed one input event. Returns whether scene or view state changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::Key { key, modifiers } = event
            && self.text_edit.overlay().is_some()
        {
            let outcome = self.text_edit.key(key, *modifiers);
            return self.conclude_edit(outcome);
        }

        match event {
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.shortcut(action),
                None => false,
            },

            InputEvent::Wheel { x, y, delta_y } => {
                let changed = self.viewport.wheel(Point::new(*x, *y), *delta_y);
                if changed {
                    self.sync();
                }
                changed
            }

            InputEvent::DoubleClick { x, y } => {
                let canvas = self.viewport.to_canvas(Point::new(*x, *y));
                let hit = hit_test(self.scene.entities(), canvas, self.text_edit.editing_id());
                match hit {
                    Some(id) => self.begin_text_edit(id),
                    None => false,
                }
            }

            InputEvent::PointerDown { .. }
            | InputEvent::PointerMove { .. }
            | InputEvent::PointerUp { .. } => self.pointer(event),
        }
    }

    fn shortcut(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Delete => self.delete_selection(),
            ShortcutAction::Duplicate => self.duplicate_selection(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::Deselect => self.clear_selection(),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.set_zoom(1.0),
        }
    }

    fn pointer(&mut self, event: &InputEvent) -> bool {
        let mut changed = false;
        if matches!(event, InputEvent::PointerDown { .. }) && self.text_edit.overlay().is_some() {
            changed |= self.finish_edit();
        }

        let Some((x, y)) = event.position() else {
            return changed;
        };
        let canvas = self.viewport.to_canvas(Point::new(x, y));
        let actions = {
            let ctx = ToolContext {
                scene: &self.scene,
                viewport: &self.viewport,
                hit: hit_test(self.scene.entities(), canvas, self.text_edit.editing_id()),
                handles: self.handle_box(),
            };
            self.tool.handle(event, &ctx)
        };

        for action in actions {
            match action {
                ToolAction::Command(command) => changed |= self.scene.apply(command),
                ToolAction::Pan(delta) => {
                    self.viewport.pan_by(delta);
                    changed = true;
                }
            }
        }
        // previews move nodes even when nothing was committed
        let previewing = self.tool.has_preview();
        if changed || previewing || matches!(event, InputEvent::PointerUp { .. }) {
            self.sync();
        }
        changed
    }

    /// Open the overlay on a text entity. A session already open is
    /// committed first.
    pub fn begin_text_edit(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.scene.get(id).filter(|e| e.kind() == EntityKind::Text) else {
            return false;
        };
        let previous = self.text_edit.open(entity, &self.viewport);
        self.tool.reset();
        self.conclude_edit(previous);
        self.sync();
        true
    }

    /// The overlay's text box changed.
    pub fn overlay_input(&mut self, text: &str) {
        self.text_edit.input(text);
    }

    /// The overlay lost focus: commit.
    pub fn overlay_blur(&mut self) -> bool {
        self.finish_edit()
    }

    /// Commit an open edit, if any.
    fn finish_edit(&mut self) -> bool {
        let outcome = self.text_edit.commit();
        self.conclude_edit(outcome)
    }

    fn conclude_edit(&mut self, outcome: Option<EditOutcome>) -> bool {
        let changed = match outcome {
            Some(EditOutcome::Commit { id, text }) => {
                self.scene.apply(SceneCommand::SetText { id, text })
            }
            Some(EditOutcome::Cancel { id }) => {
                log::debug!("text edit of {id} cancelled");
                false
            }
            None => return false,
        };
        self.sync();
        changed
    }

    /// Host finished loading an image URL.
    pub fn image_loaded(&mut self, url: &str, result: Result<Bitmap, RenderError>) -> usize {
        self.reconciler.image_loaded(url, result, &mut self.surface)
    }

    /// Web fonts became available.
    pub fn fonts_ready(&mut self) -> usize {
        self.reconciler.fonts_ready(&mut self.surface)
    }

    /// The original document plus the current entities, or `None` before
    /// any import.
    pub fn export(&self) -> Option<ExportDocument> {
        self.document
            .as_ref()
            .map(|doc| export_document(doc, self.scene.entities()))
    }

    // ─── Internals ──────────────────────────────────────────────────────

    fn run(&mut self, command: SceneCommand) -> bool {
        let changed = self.scene.apply(command);
        if changed {
            self.sync();
        }
        changed
    }

    /// Box of `size` centered on the canvas, or on the visible area when
    /// nothing has been imported.
    fn centered(&self, size: Size) -> Geometry {
        let center = if self.canvas_size.is_zero_area() {
            let c = self.viewport.container();
            self.viewport.to_canvas(Point::new(c.width / 2.0, c.height / 2.0))
        } else {
            Point::new(self.canvas_size.width / 2.0, self.canvas_size.height / 2.0)
        };
        Geometry {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    fn handle_ids(&self) -> IdList {
        self.scene
            .selection()
            .iter()
            .filter(|s| self.scene.get(s.id).is_some_and(|e| e.draggable))
            .map(|s| s.id)
            .collect()
    }

    /// Push scene and view state to the surface.
    fn sync(&mut self) {
        if let Some(id) = self.text_edit.editing_id()
            && self.scene.get(id).is_none()
        {
            self.text_edit.cancel();
            log::debug!("edited entity {id} is gone; overlay cancelled");
        }

        if self.tool.has_preview() {
            let mut view = self.scene.entities().to_vec();
            self.tool.apply_preview(&mut view);
            self.reconciler.reconcile(&view, &mut self.surface);
        } else {
            self.reconciler.reconcile(self.scene.entities(), &mut self.surface);
        }

        let editing = self.text_edit.editing_id();
        let handles = self.handle_ids();
        self.surface.set_handles(&handles);
        self.surface
            .set_handles_visible(editing.is_none() && !handles.is_empty());
        self.reconciler.set_hidden(editing, &mut self.surface);
        self.surface
            .set_stage_transform(self.viewport.zoom(), self.viewport.pan());

        if let Some(id) = editing
            && let Some(entity) = self.scene.get(id)
        {
            self.text_edit.reposition(entity, &self.viewport);
        }
    }
}
