//! Select tool: click selection, drag, pan and handle transforms.
//!
//! The tool turns pointer events into [`ToolAction`]s. Nothing is written
//! to the scene while a gesture is in flight; drags and transforms keep a
//! preview that the editor overlays on the entities it reconciles, and the
//! final values are committed as one [`SceneCommand`] on pointer-up.
//!
//! | Press on | Release without travel | Travel |
//! |----------|------------------------|--------|
//! | draggable entity | click-select | move (selection, or just it) |
//! | locked entity / background | clear selection | pan the stage |
//! | resize anchor | (none) | resize the handle box |
//! | rotate anchor | (none) | rotate about the box center |

use crate::input::{InputEvent, Modifiers};
use crate::scene::{SceneCommand, SceneModel, TransformUpdate};
use crate::viewport::Viewport;
use kurbo::{Affine, Point, Vec2};
use ld_core::id::EntityId;
use ld_core::model::{Entity, Geometry};
use ld_render::handles::{Anchor, HandleBox};

/// Pointer travel, in screen pixels, below which a press is a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

/// Smallest handle box a resize may produce.
pub const MIN_TRANSFORM_WIDTH: f64 = 30.0;
pub const MIN_TRANSFORM_HEIGHT: f64 = 20.0;

/// Rotations within this many degrees of a right angle snap to it.
pub const ROTATION_SNAP_TOLERANCE: f64 = 5.0;

const ROTATION_SNAPS: [f64; 5] = [0.0, 90.0, 180.0, 270.0, 360.0];

/// What the editor should do in response to an event.
#[derive(Debug, Clone)]
pub enum ToolAction {
    Command(SceneCommand),
    /// Pan the stage by a screen-space delta.
    Pan(Vec2),
}

/// Read-only state a tool needs to interpret an event.
pub struct ToolContext<'a> {
    pub scene: &'a SceneModel,
    pub viewport: &'a Viewport,
    /// Topmost entity under the pointer.
    pub hit: Option<EntityId>,
    /// The visible handle box, if any.
    pub handles: Option<HandleBox>,
}

#[derive(Debug, Clone)]
enum Gesture {
    Idle,
    Pressed {
        start: Point,
        target: Option<EntityId>,
        modifiers: Modifiers,
    },
    Dragging {
        start: Point,
        origins: Vec<(EntityId, Point)>,
        delta: Vec2,
    },
    Panning {
        last: Point,
    },
    Transforming(TransformSession),
}

#[derive(Debug, Clone)]
pub struct SelectTool {
    gesture: Gesture,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    pub fn is_transforming(&self) -> bool {
        matches!(self.gesture, Gesture::Transforming(_))
    }

    /// Abort any gesture without committing.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn handle(&mut self, event: &InputEvent, ctx: &ToolContext<'_>) -> Vec<ToolAction> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers, ctx);
                vec![]
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y), ctx),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(*x, *y), ctx),
            _ => vec![],
        }
    }

    fn pointer_down(&mut self, screen: Point, modifiers: Modifiers, ctx: &ToolContext<'_>) {
        let canvas = ctx.viewport.to_canvas(screen);
        let anchor = ctx
            .handles
            .and_then(|b| b.hit_anchor(canvas, ctx.viewport.zoom()).map(|a| (b, a)));

        self.gesture = match anchor {
            Some((handle_box, anchor)) => {
                let items = ctx
                    .scene
                    .selection()
                    .iter()
                    .filter_map(|s| ctx.scene.get(s.id))
                    .filter(|e| e.draggable)
                    .map(|e| (e.id, e.geometry(), e.style.rotation))
                    .collect();
                Gesture::Transforming(TransformSession::new(anchor, handle_box, items, canvas))
            }
            None => Gesture::Pressed {
                start: screen,
                target: ctx.hit,
                modifiers,
            },
        };
    }

    fn pointer_move(&mut self, screen: Point, ctx: &ToolContext<'_>) -> Vec<ToolAction> {
        match &mut self.gesture {
            Gesture::Idle => vec![],

            Gesture::Pressed { start, target, .. } => {
                if (screen - *start).hypot() <= CLICK_TOLERANCE {
                    return vec![];
                }
                let start = *start;
                let draggable = target.and_then(|id| ctx.scene.get(id)).filter(|e| e.draggable);
                match draggable {
                    Some(entity) => {
                        let origins = drag_set(entity, ctx.scene);
                        let delta = (screen - start) / ctx.viewport.zoom();
                        self.gesture = Gesture::Dragging {
                            start,
                            origins,
                            delta,
                        };
                        vec![]
                    }
                    None => {
                        self.gesture = Gesture::Panning { last: screen };
                        vec![ToolAction::Pan(screen - start)]
                    }
                }
            }

            Gesture::Dragging { start, delta, .. } => {
                *delta = (screen - *start) / ctx.viewport.zoom();
                vec![]
            }

            Gesture::Panning { last } => {
                let d = screen - *last;
                *last = screen;
                vec![ToolAction::Pan(d)]
            }

            Gesture::Transforming(session) => {
                session.update(ctx.viewport.to_canvas(screen));
                vec![]
            }
        }
    }

    fn pointer_up(&mut self, screen: Point, ctx: &ToolContext<'_>) -> Vec<ToolAction> {
        // Fold the release position into a running gesture before committing.
        let mut actions = if matches!(self.gesture, Gesture::Idle | Gesture::Pressed { .. }) {
            vec![]
        } else {
            self.pointer_move(screen, ctx)
        };
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle | Gesture::Panning { .. } => {}

            Gesture::Pressed {
                target, modifiers, ..
            } => actions.push(ToolAction::Command(SceneCommand::Click {
                target,
                additive: modifiers.additive(),
            })),

            Gesture::Dragging { origins, delta, .. } => {
                if delta != Vec2::ZERO {
                    let moves = origins
                        .into_iter()
                        .map(|(id, p)| (id, p.x + delta.x, p.y + delta.y))
                        .collect();
                    actions.push(ToolAction::Command(SceneCommand::Move { moves }));
                }
            }

            Gesture::Transforming(session) => {
                if let Some(updates) = session.current {
                    actions.push(ToolAction::Command(SceneCommand::Transform { updates }));
                }
            }
        }
        actions
    }

    /// Overlay the in-flight gesture onto `entities`.
    pub fn apply_preview(&self, entities: &mut [Entity]) {
        match &self.gesture {
            Gesture::Dragging { origins, delta, .. } => {
                for (id, origin) in origins {
                    if let Some(e) = entities.iter_mut().find(|e| e.id == *id) {
                        e.x = origin.x + delta.x;
                        e.y = origin.y + delta.y;
                    }
                }
            }
            Gesture::Transforming(TransformSession {
                current: Some(updates),
                ..
            }) => {
                for u in updates {
                    if let Some(e) = entities.iter_mut().find(|e| e.id == u.id) {
                        e.set_geometry(u.geometry);
                        e.style.rotation = u.rotation;
                    }
                }
            }
            _ => {}
        }
    }

    pub fn has_preview(&self) -> bool {
        matches!(
            self.gesture,
            Gesture::Dragging { .. }
                | Gesture::Transforming(TransformSession {
                    current: Some(_),
                    ..
                })
        )
    }
}

/// Entities moved by dragging `grabbed`: the whole draggable selection when
/// it is selected, otherwise just itself.
fn drag_set(grabbed: &Entity, scene: &SceneModel) -> Vec<(EntityId, Point)> {
    if !scene.is_selected(grabbed.id) {
        return vec![(grabbed.id, Point::new(grabbed.x, grabbed.y))];
    }
    scene
        .selection()
        .iter()
        .filter_map(|s| scene.get(s.id))
        .filter(|e| e.draggable)
        .map(|e| (e.id, Point::new(e.x, e.y)))
        .collect()
}

// ─── Transform session ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TransformSession {
    anchor: Anchor,
    start_box: HandleBox,
    items: Vec<(EntityId, Geometry, f64)>,
    start_pointer: Point,
    current: Option<Vec<TransformUpdate>>,
}

impl TransformSession {
    fn new(
        anchor: Anchor,
        start_box: HandleBox,
        items: Vec<(EntityId, Geometry, f64)>,
        start_pointer: Point,
    ) -> Self {
        Self {
            anchor,
            start_box,
            items,
            start_pointer,
            current: None,
        }
    }

    fn update(&mut self, pointer: Point) {
        self.current = Some(match self.anchor {
            Anchor::Rotate => self.rotate(pointer),
            anchor => self.resize(anchor, pointer),
        });
    }

    fn resize(&self, anchor: Anchor, pointer: Point) -> Vec<TransformUpdate> {
        let frame = self.start_box.transform();
        let inverse = frame.inverse();
        let local = inverse * pointer;
        let g = self.start_box.geometry;

        let (move_left, move_top, move_right, move_bottom) = anchor.edges();
        let (mut left, mut top, mut right, mut bottom) = (0.0, 0.0, g.width, g.height);
        if move_left {
            left = local.x;
        }
        if move_right {
            right = local.x;
        }
        if move_top {
            top = local.y;
        }
        if move_bottom {
            bottom = local.y;
        }

        if right - left < MIN_TRANSFORM_WIDTH {
            if move_left {
                left = right - MIN_TRANSFORM_WIDTH;
            } else {
                right = left + MIN_TRANSFORM_WIDTH;
            }
        }
        if bottom - top < MIN_TRANSFORM_HEIGHT {
            if move_top {
                top = bottom - MIN_TRANSFORM_HEIGHT;
            } else {
                bottom = top + MIN_TRANSFORM_HEIGHT;
            }
        }

        let sx = if g.width > 0.0 { (right - left) / g.width } else { 1.0 };
        let sy = if g.height > 0.0 { (bottom - top) / g.height } else { 1.0 };

        self.items
            .iter()
            .map(|(id, eg, rotation)| {
                let offset = inverse * Point::new(eg.x, eg.y);
                let p = frame * Point::new(left + offset.x * sx, top + offset.y * sy);
                TransformUpdate {
                    id: *id,
                    geometry: Geometry {
                        x: p.x,
                        y: p.y,
                        width: eg.width * sx,
                        height: eg.height * sy,
                    },
                    rotation: *rotation,
                }
            })
            .collect()
    }

    fn rotate(&self, pointer: Point) -> Vec<TransformUpdate> {
        let center = self.start_box.center();
        let angle_to = |p: Point| (p.y - center.y).atan2(p.x - center.x).to_degrees();
        let swept = angle_to(pointer) - angle_to(self.start_pointer);
        let target = snap_rotation(self.start_box.rotation + swept);
        let delta = target - self.start_box.rotation;
        let turn = Affine::rotate_about(delta.to_radians(), center);

        self.items
            .iter()
            .map(|(id, eg, rotation)| {
                let p = turn * Point::new(eg.x, eg.y);
                TransformUpdate {
                    id: *id,
                    geometry: Geometry {
                        x: p.x,
                        y: p.y,
                        ..*eg
                    },
                    rotation: normalize_degrees(rotation + delta),
                }
            })
            .collect()
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Snap to the nearest right angle when within [`ROTATION_SNAP_TOLERANCE`].
pub fn snap_rotation(angle: f64) -> f64 {
    let a = normalize_degrees(angle);
    ROTATION_SNAPS
        .iter()
        .find(|s| (a - **s).abs() <= ROTATION_SNAP_TOLERANCE)
        .map_or(a, |s| normalize_degrees(*s))
}
