//! Flat, editable entity model.
//!
//! The importer turns the nested design tree into a `Vec<Entity>`; every
//! later stage (scene model, reconciler, export) works on that flat list.
//! Geometry and style are shared by all entity kinds, while the payload
//! that only makes sense for one kind lives in [`EntityPayload`].

use crate::document::VisualElement;
use crate::id::EntityId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            )),
            6 => Some(Self::rgb(
                hex_val(bytes[0])? << 4 | hex_val(bytes[1])?,
                hex_val(bytes[2])? << 4 | hex_val(bytes[3])?,
                hex_val(bytes[4])? << 4 | hex_val(bytes[5])?,
            )),
            _ => None,
        }
    }

    /// Lower-case `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill, stroke or background paint.
///
/// Serialized the way style panels speak it: a hex string or `"transparent"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Solid(Color),
    Transparent,
}

impl Paint {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("transparent") {
            return Some(Paint::Transparent);
        }
        Color::from_hex(s).map(Paint::Solid)
    }

    /// The solid color, if this paint is one.
    pub fn solid(&self) -> Option<Color> {
        match self {
            Paint::Solid(c) => Some(*c),
            Paint::Transparent => None,
        }
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Solid(c) => f.write_str(&c.to_hex()),
            Paint::Transparent => f.write_str("transparent"),
        }
    }
}

impl Serialize for Paint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Paint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Paint::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid paint `{s}`")))
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Case-insensitive parse of `left` / `center` / `right`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Resolved style of an entity. Field names match the export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Paint>,
    /// Clockwise rotation in degrees about the entity's top-left corner.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: None,
            corner_radius: None,
            opacity: 1.0,
            font_family: None,
            font_size: None,
            font_style: None,
            font_weight: None,
            text_decoration: None,
            align: None,
            background_color: None,
            rotation: 0.0,
        }
    }
}

/// A partial style update from a property panel. `None` leaves the field
/// untouched; values are applied as given (no range clamping).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub stroke_width: Option<f64>,
    pub corner_radius: Option<f64>,
    pub opacity: Option<f64>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_style: Option<FontStyle>,
    pub font_weight: Option<u16>,
    pub text_decoration: Option<String>,
    pub align: Option<TextAlign>,
    pub background_color: Option<Paint>,
    pub rotation: Option<f64>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }

    /// The subset of this patch that an entity of `kind` accepts.
    ///
    /// Font, decoration, alignment and background fields only reach text;
    /// stroke and corner fields only reach rectangles and images; fill,
    /// opacity and rotation reach everything.
    pub fn accepted_by(&self, kind: EntityKind) -> StylePatch {
        let text = kind == EntityKind::Text;
        let shape = !text;
        StylePatch {
            fill: self.fill,
            stroke: self.stroke.filter(|_| shape),
            stroke_width: self.stroke_width.filter(|_| shape),
            corner_radius: self.corner_radius.filter(|_| shape),
            opacity: self.opacity,
            font_family: self.font_family.clone().filter(|_| text),
            font_size: self.font_size.filter(|_| text),
            font_style: self.font_style.filter(|_| text),
            font_weight: self.font_weight.filter(|_| text),
            text_decoration: self.text_decoration.clone().filter(|_| text),
            align: self.align.filter(|_| text),
            background_color: self.background_color.filter(|_| text),
            rotation: self.rotation,
        }
    }

    /// Write every set field into `style`.
    pub fn apply(&self, style: &mut Style) {
        fn set<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        set(&mut style.fill, &self.fill);
        set(&mut style.stroke, &self.stroke);
        set(&mut style.stroke_width, &self.stroke_width);
        set(&mut style.corner_radius, &self.corner_radius);
        set(&mut style.font_family, &self.font_family);
        set(&mut style.font_size, &self.font_size);
        set(&mut style.font_style, &self.font_style);
        set(&mut style.font_weight, &self.font_weight);
        set(&mut style.text_decoration, &self.text_decoration);
        set(&mut style.align, &self.align);
        set(&mut style.background_color, &self.background_color);
        if let Some(opacity) = self.opacity {
            style.opacity = opacity;
        }
        if let Some(rotation) = self.rotation {
            style.rotation = rotation;
        }
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Rect,
    Image,
    Text,
}

/// Kind-specific payload. The tag doubles as the entity kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EntityPayload {
    Rect,
    Image {
        #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Text {
        text: String,
    },
}

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A flat, independently editable unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    #[serde(flatten)]
    pub payload: EntityPayload,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draggable: bool,
    pub z_order: u32,
    pub style: Style,
    /// The element this entity was imported from (subtree detached).
    #[serde(skip)]
    pub source: Option<Arc<VisualElement>>,
}

impl Entity {
    pub fn new(id: EntityId, payload: EntityPayload, geometry: Geometry) -> Self {
        Self {
            id,
            payload,
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            draggable: true,
            z_order: 0,
            style: Style::default(),
            source: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.payload {
            EntityPayload::Rect => EntityKind::Rect,
            EntityPayload::Image { .. } => EntityKind::Image,
            EntityPayload::Text { .. } => EntityKind::Text,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            EntityPayload::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.payload {
            EntityPayload::Image { url } => url.as_deref(),
            _ => None,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn set_geometry(&mut self, g: Geometry) {
        self.x = g.x;
        self.y = g.y;
        self.width = g.width;
        self.height = g.height;
    }

    pub fn selection_entry(&self) -> SelectionEntry {
        SelectionEntry {
            id: self.id,
            kind: self.kind(),
            style: self.style.clone(),
        }
    }
}

/// Lightweight projection of a selected entity for property panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionEntry {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub style: Style,
}
