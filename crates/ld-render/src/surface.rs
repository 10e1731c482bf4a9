//! Retained-mode rendering surface.
//!
//! [`RenderSurface`] is the narrow interface the reconciler drives: create,
//! update and destroy nodes keyed by entity id, reorder them, attach decoded
//! images and toggle visibility. [`RetainedScene`] is the in-memory
//! implementation the painter reads from; hosts with their own scene graph
//! implement the trait directly.

use crate::image::Bitmap;
use kurbo::{Affine, Vec2};
use ld_core::id::EntityId;
use ld_core::model::{Entity, EntityPayload, Geometry, Style};
use std::collections::HashMap;

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Rect,
    /// An image entity with a URL. Image entities without one render as
    /// [`NodeKind::Rect`] using their fill.
    Image { url: String },
    Text { text: String },
}

/// Everything a surface needs to draw one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProps {
    pub kind: NodeKind,
    pub geometry: Geometry,
    pub style: Style,
    pub draggable: bool,
}

impl NodeProps {
    pub fn image_url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Image { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Node-local → canvas transform: translate to the top-left corner, then
    /// rotate about it.
    pub fn transform(&self) -> Affine {
        node_transform(self.geometry, self.style.rotation)
    }
}

impl From<&Entity> for NodeProps {
    fn from(e: &Entity) -> Self {
        let kind = match &e.payload {
            EntityPayload::Rect | EntityPayload::Image { url: None } => NodeKind::Rect,
            EntityPayload::Image { url: Some(url) } => NodeKind::Image { url: url.clone() },
            EntityPayload::Text { text } => NodeKind::Text { text: text.clone() },
        };
        Self {
            kind,
            geometry: e.geometry(),
            style: e.style.clone(),
            draggable: e.draggable,
        }
    }
}

/// Transform of a box placed at `g` and rotated `rotation` degrees about its
/// top-left corner.
pub fn node_transform(g: Geometry, rotation: f64) -> Affine {
    Affine::translate((g.x, g.y)) * Affine::rotate(rotation.to_radians())
}

/// Mutable retained scene driven by the reconciler and the editor.
pub trait RenderSurface {
    fn create_node(&mut self, id: EntityId, props: &NodeProps);
    fn update_node(&mut self, id: EntityId, props: &NodeProps);
    fn destroy_node(&mut self, id: EntityId);

    /// Back-to-front order of every live node.
    fn set_paint_order(&mut self, order: &[EntityId]);

    /// Attach a decoded image, or clear it to show the empty placeholder.
    fn set_node_image(&mut self, id: EntityId, image: Option<&Bitmap>);

    /// Ask the host to fetch `url`. The host answers later through the
    /// editor's image-loaded command.
    fn request_image(&mut self, url: &str);

    /// Re-measure a text node after web fonts become available.
    fn refresh_text(&mut self, id: EntityId);

    fn set_node_visible(&mut self, id: EntityId, visible: bool);

    /// Entities the transform handles wrap.
    fn set_handles(&mut self, ids: &[EntityId]);
    fn set_handles_visible(&mut self, visible: bool);

    /// Stage scale and screen-space pan.
    fn set_stage_transform(&mut self, scale: f64, pan: Vec2);
}

/// One node of a [`RetainedScene`].
#[derive(Debug, Clone)]
pub struct RetainedNode {
    pub props: NodeProps,
    pub image: Option<Bitmap>,
    pub visible: bool,
    /// Bumped by every text refresh.
    pub text_revision: u32,
}

/// Operation counters, useful to assert that a pass did no redundant work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStats {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
    pub images_set: usize,
}

#[derive(Debug)]
pub struct RetainedScene {
    nodes: HashMap<EntityId, RetainedNode>,
    order: Vec<EntityId>,
    handles: Vec<EntityId>,
    handles_visible: bool,
    scale: f64,
    pan: Vec2,
    image_requests: Vec<String>,
    stats: SurfaceStats,
}

impl Default for RetainedScene {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            handles: Vec::new(),
            handles_visible: true,
            scale: 1.0,
            pan: Vec2::ZERO,
            image_requests: Vec::new(),
            stats: SurfaceStats::default(),
        }
    }
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: EntityId) -> Option<&RetainedNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn paint_order(&self) -> &[EntityId] {
        &self.order
    }

    /// Live nodes back-to-front.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = (EntityId, &RetainedNode)> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| (*id, n)))
    }

    pub fn handles(&self) -> &[EntityId] {
        &self.handles
    }

    pub fn handles_visible(&self) -> bool {
        self.handles_visible
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Canvas → screen transform.
    pub fn stage_transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale)
    }

    /// URLs requested since the last call.
    pub fn take_image_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.image_requests)
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }
}

impl RenderSurface for RetainedScene {
    fn create_node(&mut self, id: EntityId, props: &NodeProps) {
        self.stats.created += 1;
        self.nodes.insert(
            id,
            RetainedNode {
                props: props.clone(),
                image: None,
                visible: true,
                text_revision: 0,
            },
        );
        self.order.push(id);
    }

    fn update_node(&mut self, id: EntityId, props: &NodeProps) {
        if let Some(node) = self.nodes.get_mut(&id) {
            self.stats.updated += 1;
            node.props = props.clone();
        }
    }

    fn destroy_node(&mut self, id: EntityId) {
        if self.nodes.remove(&id).is_some() {
            self.stats.destroyed += 1;
            self.order.retain(|o| *o != id);
            self.handles.retain(|h| *h != id);
        }
    }

    fn set_paint_order(&mut self, order: &[EntityId]) {
        self.order = order
            .iter()
            .copied()
            .filter(|id| self.nodes.contains_key(id))
            .collect();
    }

    fn set_node_image(&mut self, id: EntityId, image: Option<&Bitmap>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            self.stats.images_set += 1;
            node.image = image.cloned();
        }
    }

    fn request_image(&mut self, url: &str) {
        self.image_requests.push(url.to_owned());
    }

    fn refresh_text(&mut self, id: EntityId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text_revision += 1;
        }
    }

    fn set_node_visible(&mut self, id: EntityId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    fn set_handles(&mut self, ids: &[EntityId]) {
        self.handles = ids.to_vec();
    }

    fn set_handles_visible(&mut self, visible: bool) {
        self.handles_visible = visible;
    }

    fn set_stage_transform(&mut self, scale: f64, pan: Vec2) {
        self.scale = scale;
        self.pan = pan;
    }
}
