//! Retained scene → Vello drawing commands.
//!
//! Walks the live nodes back-to-front under the stage transform and emits
//! fills, strokes and images, then draws the transform handles on top.

use crate::handles::{ANCHOR_SIZE, Anchor, HandleBox};
use crate::surface::{NodeKind, NodeProps, RetainedNode, RetainedScene};
use kurbo::{Affine, Line, Point, Rect, RoundedRect, Shape, Stroke};
use ld_core::model::{Paint, Style};
use peniko::{Color, Fill};
use vello::Scene;

const HANDLE_COLOR: Color = Color::from_rgba8(14, 165, 233, 255);
const PLACEHOLDER_COLOR: Color = Color::from_rgba8(229, 231, 235, 255);

/// Paint the retained scene to a Vello scene.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_scene(scene: &mut Scene, retained: &RetainedScene) {
    let stage = retained.stage_transform();
    for (id, node) in retained.nodes_in_order() {
        if !node.visible {
            continue;
        }
        log::trace!("PAINT {id:?} {:?}", node.props.kind);
        paint_node(scene, stage, node);
    }
    if retained.handles_visible() {
        paint_handles(scene, retained);
    }
}

fn paint_node(scene: &mut Scene, stage: Affine, node: &RetainedNode) {
    let props = &node.props;
    let transform = stage * props.transform();
    let bounds = Rect::new(0.0, 0.0, props.geometry.width, props.geometry.height);

    match &props.kind {
        NodeKind::Rect => paint_rect(scene, transform, bounds, &props.style),

        NodeKind::Image { .. } => match &node.image {
            Some(bitmap) if bitmap.width > 0 && bitmap.height > 0 => {
                let fit = Affine::scale_non_uniform(
                    bounds.width() / bitmap.width as f64,
                    bounds.height() / bitmap.height as f64,
                );
                let image = bitmap.to_image().with_alpha(clamp_alpha(props.style.opacity));
                scene.draw_image(&image, transform * fit);
                stroke_shape(scene, transform, &rounded(bounds, &props.style), &props.style);
            }
            _ => paint_placeholder(scene, transform, bounds, props),
        },

        NodeKind::Text { text } => {
            if let Some(Paint::Solid(bg)) = props.style.background_color {
                scene.fill(
                    Fill::NonZero,
                    transform,
                    to_color(bg, props.style.opacity),
                    None,
                    &bounds,
                );
            }
            log::trace!(
                "TEXT {:?} {}px {:?} at ({}, {})",
                text,
                props.style.font_size.unwrap_or_default(),
                props.style.font_family,
                props.geometry.x,
                props.geometry.y
            );
            // Glyph layout is left to the host, which owns the font stack.
        }
    }
}

// ─── Shape painters ──────────────────────────────────────────────────────────

fn rounded(bounds: Rect, style: &Style) -> RoundedRect {
    bounds.to_rounded_rect(style.corner_radius.unwrap_or(0.0))
}

fn paint_rect(scene: &mut Scene, transform: Affine, bounds: Rect, style: &Style) {
    let shape = rounded(bounds, style);
    fill_shape(scene, transform, &shape, style);
    stroke_shape(scene, transform, &shape, style);
}

/// An image that has not loaded (or failed) shows an empty frame.
fn paint_placeholder(scene: &mut Scene, transform: Affine, bounds: Rect, props: &NodeProps) {
    let shape = rounded(bounds, &props.style);
    let alpha = clamp_alpha(props.style.opacity);
    scene.fill(
        Fill::NonZero,
        transform,
        PLACEHOLDER_COLOR.multiply_alpha(alpha),
        None,
        &shape,
    );
    stroke_shape(scene, transform, &shape, &props.style);
}

// ─── Fill and stroke ─────────────────────────────────────────────────────────

fn fill_shape(scene: &mut Scene, transform: Affine, shape: &impl Shape, style: &Style) {
    if let Some(Paint::Solid(c)) = style.fill {
        scene.fill(Fill::NonZero, transform, to_color(c, style.opacity), None, shape);
    }
}

fn stroke_shape(scene: &mut Scene, transform: Affine, shape: &impl Shape, style: &Style) {
    let width = style.stroke_width.unwrap_or(0.0);
    if width <= 0.0 {
        return;
    }
    if let Some(Paint::Solid(c)) = style.stroke {
        scene.stroke(
            &Stroke::new(width),
            transform,
            to_color(c, style.opacity),
            None,
            shape,
        );
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────────

fn paint_handles(scene: &mut Scene, retained: &RetainedScene) {
    let items = retained
        .handles()
        .iter()
        .filter_map(|id| retained.node(*id))
        .map(|n| (n.props.geometry, n.props.style.rotation));
    let Some(handle_box) = HandleBox::around(items) else {
        return;
    };

    let stage = retained.stage_transform();
    let scale = retained.scale();
    let outline = Stroke::new(1.0);
    let g = handle_box.geometry;

    // Outline in screen space keeps a constant 1px width at any zoom.
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(g.width, 0.0),
        Point::new(g.width, g.height),
        Point::new(0.0, g.height),
    ]
    .map(|p| stage * handle_box.transform() * p);
    for i in 0..4 {
        let line = Line::new(corners[i], corners[(i + 1) % 4]);
        scene.stroke(&outline, Affine::IDENTITY, HANDLE_COLOR, None, &line);
    }

    let top_mid = stage * handle_box.transform() * Point::new(g.width / 2.0, 0.0);
    let rotate = stage * handle_box.anchor_point(Anchor::Rotate, scale);
    scene.stroke(
        &outline,
        Affine::IDENTITY,
        HANDLE_COLOR,
        None,
        &Line::new(top_mid, rotate),
    );

    let half = ANCHOR_SIZE / 2.0;
    for anchor in std::iter::once(Anchor::Rotate).chain(Anchor::RESIZE) {
        let p = stage * handle_box.anchor_point(anchor, scale);
        let square = Rect::new(p.x - half, p.y - half, p.x + half, p.y + half);
        scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            Color::from_rgba8(255, 255, 255, 255),
            None,
            &square,
        );
        scene.stroke(&outline, Affine::IDENTITY, HANDLE_COLOR, None, &square);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn clamp_alpha(opacity: f64) -> f32 {
    opacity.clamp(0.0, 1.0) as f32
}

fn to_color(c: ld_core::model::Color, opacity: f64) -> Color {
    let alpha = (255.0 * clamp_alpha(opacity)).round() as u8;
    Color::from_rgba8(c.r, c.g, c.b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Bitmap;
    use crate::surface::{NodeProps, RenderSurface};
    use ld_core::id::EntityId;
    use ld_core::model::{Entity, EntityPayload, Geometry};

    fn entity(id: &str, payload: EntityPayload) -> Entity {
        let mut e = Entity::new(
            EntityId::intern(id),
            payload,
            Geometry {
                x: 10.0,
                y: 10.0,
                width: 40.0,
                height: 20.0,
            },
        );
        e.style.fill = Some(Paint::Solid(ld_core::model::Color::rgb(1, 2, 3)));
        e.style.stroke = Some(Paint::Solid(ld_core::model::Color::BLACK));
        e.style.stroke_width = Some(2.0);
        e
    }

    #[test]
    fn paints_every_node_kind() {
        let mut retained = RetainedScene::new();
        let rect = entity("paint-rect", EntityPayload::Rect);
        let image = entity(
            "paint-image",
            EntityPayload::Image {
                url: Some("a.png".into()),
            },
        );
        let pending = entity(
            "paint-pending",
            EntityPayload::Image {
                url: Some("b.png".into()),
            },
        );
        let text = entity("paint-text", EntityPayload::Text { text: "hi".into() });
        for e in [&rect, &image, &pending, &text] {
            retained.create_node(e.id, &NodeProps::from(e));
        }
        retained.set_node_image(image.id, Some(&Bitmap::from_rgba8(2, 2, vec![255; 16])));
        retained.set_handles(&[rect.id, text.id]);
        retained.set_stage_transform(1.5, kurbo::Vec2::new(3.0, 4.0));

        let mut scene = Scene::new();
        paint_scene(&mut scene, &retained);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(clamp_alpha(1.7), 1.0);
        assert_eq!(clamp_alpha(-0.5), 0.0);
        let c = to_color(ld_core::model::Color::WHITE, 0.5);
        assert_eq!(c.to_rgba8().a, 128);
    }
}
