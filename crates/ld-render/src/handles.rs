//! Transform handle geometry.
//!
//! The handle box wraps the selected draggable entities: a single entity
//! gets a box matching its own rotated rectangle, several entities get the
//! axis-aligned bounds of all their rotated corners. Six resize anchors sit
//! on the corners and the middle of the left/right edges, and the rotate
//! anchor floats above the top edge.

use kurbo::{Affine, Point, Rect};
use ld_core::model::Geometry;

use crate::surface::node_transform;

/// Anchor square size in screen pixels.
pub const ANCHOR_SIZE: f64 = 10.0;

/// Distance of the rotate anchor above the top edge, in screen pixels.
pub const ROTATE_ANCHOR_OFFSET: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomRight,
    Rotate,
}

impl Anchor {
    pub const RESIZE: [Anchor; 6] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ];

    /// Which edges of the box this anchor moves: `(left, top, right, bottom)`.
    pub fn edges(self) -> (bool, bool, bool, bool) {
        match self {
            Anchor::TopLeft => (true, true, false, false),
            Anchor::TopRight => (false, true, true, false),
            Anchor::MiddleLeft => (true, false, false, false),
            Anchor::MiddleRight => (false, false, true, false),
            Anchor::BottomLeft => (true, false, false, true),
            Anchor::BottomRight => (false, false, true, true),
            Anchor::Rotate => (false, false, false, false),
        }
    }
}

/// A possibly rotated box in canvas space. `rotation` is in degrees about
/// the top-left corner, like entity rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleBox {
    pub geometry: Geometry,
    pub rotation: f64,
}

impl HandleBox {
    /// Box around `(geometry, rotation)` items. `None` when empty.
    pub fn around(items: impl IntoIterator<Item = (Geometry, f64)>) -> Option<Self> {
        let items: Vec<(Geometry, f64)> = items.into_iter().collect();
        match items.as_slice() {
            [] => None,
            [(geometry, rotation)] => Some(Self {
                geometry: *geometry,
                rotation: *rotation,
            }),
            many => {
                let mut bounds: Option<Rect> = None;
                for (g, rotation) in many {
                    let t = node_transform(*g, *rotation);
                    for corner in corners(g.width, g.height) {
                        let p = t * corner;
                        let r = Rect::from_points(p, p);
                        bounds = Some(bounds.map_or(r, |b| b.union(r)));
                    }
                }
                bounds.map(|b| Self {
                    geometry: Geometry {
                        x: b.x0,
                        y: b.y0,
                        width: b.width(),
                        height: b.height(),
                    },
                    rotation: 0.0,
                })
            }
        }
    }

    /// Box-local → canvas.
    pub fn transform(&self) -> Affine {
        node_transform(self.geometry, self.rotation)
    }

    pub fn center(&self) -> Point {
        self.transform() * Point::new(self.geometry.width / 2.0, self.geometry.height / 2.0)
    }

    /// Anchor position in canvas space. The rotate anchor offset is given in
    /// screen pixels, so it depends on the stage `scale`.
    pub fn anchor_point(&self, anchor: Anchor, scale: f64) -> Point {
        let (w, h) = (self.geometry.width, self.geometry.height);
        let local = match anchor {
            Anchor::TopLeft => Point::new(0.0, 0.0),
            Anchor::TopRight => Point::new(w, 0.0),
            Anchor::MiddleLeft => Point::new(0.0, h / 2.0),
            Anchor::MiddleRight => Point::new(w, h / 2.0),
            Anchor::BottomLeft => Point::new(0.0, h),
            Anchor::BottomRight => Point::new(w, h),
            Anchor::Rotate => Point::new(w / 2.0, -ROTATE_ANCHOR_OFFSET / scale),
        };
        self.transform() * local
    }

    /// The anchor under a canvas-space point, if any.
    pub fn hit_anchor(&self, point: Point, scale: f64) -> Option<Anchor> {
        let reach = ANCHOR_SIZE / scale / 2.0;
        std::iter::once(Anchor::Rotate)
            .chain(Anchor::RESIZE)
            .find(|a| {
                let p = self.anchor_point(*a, scale);
                (p.x - point.x).abs() <= reach && (p.y - point.y).abs() <= reach
            })
    }
}

fn corners(w: f64, h: f64) -> [Point; 4] {
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}
