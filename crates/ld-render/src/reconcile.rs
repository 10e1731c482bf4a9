//! Entity list → surface nodes.
//!
//! The reconciler remembers what it last pushed to the surface and diffs
//! every new entity list against it by id, so each pass issues only the
//! create, update and destroy operations that are actually needed. It is
//! the only code that touches surface nodes.
//!
//! Image loads are asynchronous. Each distinct URL is requested once; when
//! the host reports completion, only nodes that are still live and still
//! point at that URL receive the bitmap.

use crate::error::RenderError;
use crate::image::Bitmap;
use crate::surface::{NodeProps, RenderSurface};
use ld_core::id::EntityId;
use ld_core::model::Entity;
use std::collections::HashMap;

/// Load state of one image URL.
#[derive(Debug, Clone)]
pub enum ImageSlot {
    Pending,
    Ready(Bitmap),
    Failed,
}

/// URL-keyed image cache shared by every node that shows the same image.
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: HashMap<String, ImageSlot>,
}

impl ImageCache {
    pub fn get(&self, url: &str) -> Option<&ImageSlot> {
        self.slots.get(url)
    }

    pub fn bitmap(&self, url: &str) -> Option<&Bitmap> {
        match self.slots.get(url)? {
            ImageSlot::Ready(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    pub fn insert(&mut self, url: &str, slot: ImageSlot) {
        self.slots.insert(url.to_owned(), slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// What one reconcile pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Default)]
pub struct Reconciler {
    live: HashMap<EntityId, NodeProps>,
    images: ImageCache,
    hidden: Option<EntityId>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Bring the surface in line with `entities`.
    pub fn reconcile<S: RenderSurface + ?Sized>(
        &mut self,
        entities: &[Entity],
        surface: &mut S,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut next = HashMap::with_capacity(entities.len());

        for entity in entities {
            let props = NodeProps::from(entity);
            match self.live.get(&entity.id) {
                None => {
                    surface.create_node(entity.id, &props);
                    self.attach_image(entity.id, &props, surface);
                    report.created += 1;
                }
                Some(prev) if *prev != props => {
                    surface.update_node(entity.id, &props);
                    if prev.image_url() != props.image_url() {
                        self.attach_image(entity.id, &props, surface);
                    }
                    report.updated += 1;
                }
                Some(_) => {}
            }
            next.insert(entity.id, props);
        }

        for id in self.live.keys() {
            if !next.contains_key(id) {
                surface.destroy_node(*id);
                report.destroyed += 1;
            }
        }
        self.live = next;

        let mut order: Vec<&Entity> = entities.iter().collect();
        order.sort_by_key(|e| e.z_order);
        let order: Vec<EntityId> = order.into_iter().map(|e| e.id).collect();
        surface.set_paint_order(&order);

        if self.hidden.is_some_and(|id| !self.live.contains_key(&id)) {
            self.hidden = None;
        }

        if !report.is_noop() {
            log::debug!(
                "reconcile: +{} ~{} -{} ({} live)",
                report.created,
                report.updated,
                report.destroyed,
                self.live.len()
            );
        }
        report
    }

    fn attach_image<S: RenderSurface + ?Sized>(
        &mut self,
        id: EntityId,
        props: &NodeProps,
        surface: &mut S,
    ) {
        let Some(url) = props.image_url() else {
            return;
        };
        match self.images.get(url) {
            Some(ImageSlot::Ready(bitmap)) => surface.set_node_image(id, Some(bitmap)),
            Some(ImageSlot::Pending | ImageSlot::Failed) => surface.set_node_image(id, None),
            None => {
                self.images.insert(url, ImageSlot::Pending);
                surface.request_image(url);
                surface.set_node_image(id, None);
            }
        }
    }

    /// Seed the cache with an already-decoded image so its URL is never
    /// fetched.
    pub fn preseed(&mut self, url: &str, bitmap: Bitmap) {
        self.images.insert(url, ImageSlot::Ready(bitmap));
    }

    /// Deliver an image load completion. Returns how many live nodes got the
    /// bitmap; completions for nodes that have since gone are dropped.
    pub fn image_loaded<S: RenderSurface + ?Sized>(
        &mut self,
        url: &str,
        result: Result<Bitmap, RenderError>,
        surface: &mut S,
    ) -> usize {
        let bitmap = match result {
            Ok(bitmap) => bitmap,
            Err(err) => {
                log::warn!("image load failed for {url}: {err}");
                // a late failure never evicts a bitmap already in hand
                if !matches!(self.images.get(url), Some(ImageSlot::Ready(_))) {
                    self.images.insert(url, ImageSlot::Failed);
                }
                return 0;
            }
        };

        let targets: Vec<EntityId> = self
            .live
            .iter()
            .filter(|(_, props)| props.image_url() == Some(url))
            .map(|(id, _)| *id)
            .collect();
        if targets.is_empty() {
            log::debug!("dropping stale image completion for {url}");
        }
        for id in &targets {
            surface.set_node_image(*id, Some(&bitmap));
        }
        self.images.insert(url, ImageSlot::Ready(bitmap));
        targets.len()
    }

    /// Fonts finished loading: re-measure every live text node.
    pub fn fonts_ready<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let mut count = 0;
        for (id, props) in &self.live {
            if props.is_text() {
                surface.refresh_text(*id);
                count += 1;
            }
        }
        count
    }

    /// Hide one node (the one under the text-edit overlay), restoring the
    /// previously hidden one.
    pub fn set_hidden<S: RenderSurface + ?Sized>(&mut self, id: Option<EntityId>, surface: &mut S) {
        if self.hidden == id {
            return;
        }
        if let Some(prev) = self.hidden.take()
            && self.live.contains_key(&prev)
        {
            surface.set_node_visible(prev, true);
        }
        if let Some(id) = id
            && self.live.contains_key(&id)
        {
            surface.set_node_visible(id, false);
            self.hidden = Some(id);
        }
    }

    pub fn hidden(&self) -> Option<EntityId> {
        self.hidden
    }
}
