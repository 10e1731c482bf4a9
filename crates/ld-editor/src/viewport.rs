//! Zoom and pan state.
//!
//! The viewport is the single owner of the stage scale and pan. Wheel zoom
//! and external zoom requests both write here, and the editor pushes the
//! result to the surface, so the surface scale is never read back. Setting
//! the level it already has is a no-op, which keeps the two from chasing
//! each other.

use kurbo::{Affine, Point, Size, Vec2};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;

/// Per-notch wheel zoom factor.
pub const WHEEL_STEP: f64 = 1.05;

/// Zoom-in/zoom-out button increment.
pub const ZOOM_STEP: f64 = 0.1;

/// Total margin (both sides together) kept free when fitting the canvas
/// into the container.
pub const FIT_PADDING: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
    /// Container (stage) size in screen pixels.
    container: Size,
}

impl Viewport {
    pub fn new(container: Size) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            container,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
    }

    /// Canvas → screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn to_screen(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    /// Change the zoom keeping the canvas point under `anchor` (screen
    /// space) fixed. Returns whether anything changed. Non-finite levels
    /// are ignored.
    pub fn zoom_about(&mut self, level: f64, anchor: Point) -> bool {
        if !level.is_finite() {
            log::debug!("ignoring non-finite zoom level {level}");
            return false;
        }
        let level = level.clamp(MIN_ZOOM, MAX_ZOOM);
        if level == self.zoom {
            return false;
        }
        let fixed = self.to_canvas(anchor);
        self.zoom = level;
        self.pan = anchor.to_vec2() - fixed.to_vec2() * level;
        true
    }

    /// External zoom request, anchored at the container center.
    pub fn set_zoom(&mut self, level: f64) -> bool {
        let center = Point::new(self.container.width / 2.0, self.container.height / 2.0);
        self.zoom_about(level, center)
    }

    /// Wheel zoom at the pointer: scrolling up zooms in.
    pub fn wheel(&mut self, pointer: Point, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let level = if delta_y < 0.0 {
            self.zoom * WHEEL_STEP
        } else {
            self.zoom / WHEEL_STEP
        };
        self.zoom_about(level, pointer)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Fit a canvas of `canvas` size into the container less
    /// [`FIT_PADDING`], never magnifying, and center it.
    pub fn fit(&mut self, canvas: Size) {
        let avail_w = (self.container.width - FIT_PADDING).max(1.0);
        let avail_h = (self.container.height - FIT_PADDING).max(1.0);
        let level = if canvas.width > 0.0 && canvas.height > 0.0 {
            (avail_w / canvas.width).min(avail_h / canvas.height).min(1.0)
        } else {
            1.0
        };
        self.zoom = level.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = Vec2::new(
            (self.container.width - canvas.width * self.zoom) / 2.0,
            (self.container.height - canvas.height * self.zoom) / 2.0,
        );
        log::debug!("fit {}×{} at zoom {:.3}", canvas.width, canvas.height, self.zoom);
    }
}
