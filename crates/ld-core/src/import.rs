//! Design tree → flat entity list.
//!
//! Pre-order walk that accumulates parent origins, assigns paint order from
//! visitation order and classifies each node into zero or one entity.
//!
//! Positioning follows the export's convention: a `Layer` positions its
//! children relative to its own resolved origin, while children of any other
//! kind are positioned from the canvas origin.

use crate::document::{ElementType, VisualElement};
use crate::id::EntityId;
use crate::model::*;
use std::sync::Arc;

/// Images at least this large are treated as page backgrounds.
pub const BACKGROUND_MIN_WIDTH: f64 = 800.0;
pub const BACKGROUND_MIN_HEIGHT: f64 = 600.0;

/// Font size used when a text node declares none.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Convert a design tree into editable entities.
///
/// Deterministic: the same tree always yields the same list, including
/// `z_order`. The counter advances for every visited node, so skipped nodes
/// leave gaps in the sequence.
pub fn flatten(root: &VisualElement) -> Vec<Entity> {
    let mut flattener = Flattener::default();
    flattener.visit(root, (0.0, 0.0));
    log::debug!(
        "flattened {} nodes into {} entities",
        flattener.counter,
        flattener.out.len()
    );
    flattener.out
}

#[derive(Default)]
struct Flattener {
    counter: u32,
    out: Vec<Entity>,
}

impl Flattener {
    fn visit(&mut self, node: &VisualElement, parent_origin: (f64, f64)) {
        let (x, y) = node.origin().unwrap_or_else(|| {
            let (dx, dy) = node.offset();
            (parent_origin.0 + dx, parent_origin.1 + dy)
        });

        self.counter += 1;
        let z_order = self.counter;

        if let Some(entity) = classify(node, x, y, z_order) {
            self.out.push(entity);
        }

        let child_origin = match node.element_type {
            ElementType::Layer => (x, y),
            _ => (0.0, 0.0),
        };
        for child in &node.child_elements {
            self.visit(child, child_origin);
        }
    }
}

fn classify(node: &VisualElement, x: f64, y: f64, z_order: u32) -> Option<Entity> {
    let (width, height) = node.size();
    let geometry = Geometry {
        x,
        y,
        width,
        height,
    };
    let base = Style {
        opacity: normalize_opacity(node.opacity_level()),
        ..Style::default()
    };

    let (payload, style, draggable) = match node.element_type {
        ElementType::Layer => {
            let fill = node.fill_color()?;
            let style = Style {
                fill: Some(Paint::Solid(fill)),
                stroke: Some(Paint::Solid(node.stroke_color().unwrap_or(Color::BLACK))),
                stroke_width: Some(node.border_width().unwrap_or(0.0)),
                corner_radius: Some(node.corner_radius().unwrap_or(0.0)),
                ..base
            };
            (EntityPayload::Rect, style, false)
        }
        ElementType::Image => {
            let url = node.image_source().map(str::to_owned);
            let style = Style {
                fill: url
                    .is_none()
                    .then(|| Paint::Solid(node.fill_color().unwrap_or(Color::BLACK))),
                ..base
            };
            let background = is_background_image(node.name(), geometry);
            (EntityPayload::Image { url }, style, !background)
        }
        ElementType::Text => {
            let value = node.text_value().filter(|v| !v.is_empty())?;
            let config = node.text_config();
            let (font_style, font_weight) =
                font_properties(config.and_then(|c| c.font_style.as_deref()));
            let family = config.and_then(|c| c.font_family_rec.as_deref().or(c.font_family.as_deref()));
            let style = Style {
                fill: Some(Paint::Solid(node.fill_color().unwrap_or(Color::BLACK))),
                font_family: Some(font_stack(family)),
                font_size: Some(config.and_then(|c| c.font_size).unwrap_or(DEFAULT_FONT_SIZE)),
                font_style: Some(font_style),
                font_weight: Some(font_weight),
                align: Some(
                    config
                        .and_then(|c| c.text_align.get(1))
                        .and_then(|t| TextAlign::from_token(t))
                        .unwrap_or_default(),
                ),
                background_color: Some(Paint::Transparent),
                text_decoration: Some(String::new()),
                ..base
            };
            let text = decode_line_breaks(value);
            (EntityPayload::Text { text }, style, true)
        }
        ElementType::Unknown => {
            log::trace!("skipping unsupported element {}", node.element_id);
            return None;
        }
    };

    let mut entity = Entity::new(EntityId::intern(&node.element_id), payload, geometry);
    entity.draggable = draggable;
    entity.z_order = z_order;
    entity.style = style;
    entity.source = Some(Arc::new(node.detached()));
    Some(entity)
}

/// Rescale an exported 0–255 opacity level to `0.0..=1.0` (default opaque).
pub fn normalize_opacity(level: Option<f64>) -> f64 {
    level.map_or(1.0, |l| l / 255.0)
}

/// Background heuristic: a named background, a page-sized image, or one
/// anchored at the canvas origin is locked in place.
pub fn is_background_image(name: Option<&str>, g: Geometry) -> bool {
    let named = name.is_some_and(|n| n.to_lowercase().contains("background"));
    let page_sized = g.width >= BACKGROUND_MIN_WIDTH && g.height >= BACKGROUND_MIN_HEIGHT;
    let at_origin = g.x == 0.0 && g.y == 0.0;
    named || page_sized || at_origin
}

/// Resolve a design font name to a CSS-style fallback stack.
pub fn font_stack(family: Option<&str>) -> String {
    const STACKS: &[(&str, &str)] = &[
        ("Inter", "Inter, sans-serif"),
        ("Montserrat", "Montserrat, sans-serif"),
        ("Times New Roman", "\"Times New Roman\", Times, serif"),
        ("DM Serif Text", "\"DM Serif Text\", serif"),
        ("Ibarra Real Nova", "\"Ibarra Real Nova\", serif"),
        ("Caveat", "Caveat, cursive"),
    ];
    match family {
        Some(name) => STACKS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, stack)| (*stack).to_string())
            .unwrap_or_else(|| format!("{name}, sans-serif")),
        None => "Arial, sans-serif".to_string(),
    }
}

/// Split an exported style token such as `"Bold Italic"` into slant and
/// numeric weight.
pub fn font_properties(token: Option<&str>) -> (FontStyle, u16) {
    let Some(token) = token else {
        return (FontStyle::Normal, 400);
    };
    let lower = token.to_lowercase();
    let style = if lower.contains("italic") {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    };
    let weight = match lower.replacen("italic", "", 1).trim() {
        "thin" => 100,
        "extralight" => 200,
        "light" => 300,
        "regular" | "normal" => 400,
        "medium" => 500,
        "semibold" | "semi_bold" => 600,
        "bold" => 700,
        "extrabold" => 800,
        "black" => 900,
        _ => 400,
    };
    (style, weight)
}

/// Turn literal `\n` escape sequences into real line breaks.
pub fn decode_line_breaks(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_is_rescaled() {
        assert!((normalize_opacity(Some(204.0)) - 0.8).abs() < 1e-9);
        assert_eq!(normalize_opacity(None), 1.0);
        assert_eq!(normalize_opacity(Some(0.0)), 0.0);
    }

    #[test]
    fn font_stack_lookup() {
        assert_eq!(font_stack(Some("Caveat")), "Caveat, cursive");
        assert_eq!(font_stack(Some("Roboto")), "Roboto, sans-serif");
        assert_eq!(font_stack(None), "Arial, sans-serif");
    }

    #[test]
    fn font_properties_parse_weight_and_slant() {
        assert_eq!(font_properties(Some("Bold")), (FontStyle::Normal, 700));
        assert_eq!(font_properties(Some("medium italic")), (FontStyle::Italic, 500));
        assert_eq!(font_properties(Some("Italic")), (FontStyle::Italic, 400));
        assert_eq!(font_properties(Some("Semi_Bold")), (FontStyle::Normal, 600));
        assert_eq!(font_properties(Some("condensed")), (FontStyle::Normal, 400));
        assert_eq!(font_properties(None), (FontStyle::Normal, 400));
    }

    #[test]
    fn background_heuristic_cases() {
        let g = |x, y, width, height| Geometry {
            x,
            y,
            width,
            height,
        };
        assert!(is_background_image(Some("background_image"), g(300.0, 300.0, 10.0, 10.0)));
        assert!(is_background_image(Some("Hero BACKGROUND"), g(5.0, 5.0, 10.0, 10.0)));
        assert!(is_background_image(None, g(0.0, 0.0, 600.0, 600.0)));
        assert!(is_background_image(None, g(40.0, 40.0, 800.0, 600.0)));
        assert!(!is_background_image(
            Some("logo_foreground"),
            g(100.0, 750.0, 200.0, 100.0)
        ));
    }

    #[test]
    fn line_breaks_are_decoded() {
        assert_eq!(decode_line_breaks("a\\nb"), "a\nb");
        assert_eq!(decode_line_breaks("plain"), "plain");
    }
}
