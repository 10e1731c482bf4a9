//! Wire model of the Codia design export consumed by the importer.
//!
//! The structs mirror the JSON field names of the export (`elementId`,
//! `styleConfig.widthSpec.value`, ...). Accessors on [`VisualElement`]
//! expose the handful of values the flattener actually needs, so the rest of
//! the crate never reaches into the nested option soup directly.

use crate::error::ImportError;
use crate::model::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

/// Canvas configuration block. `baseHeight` falls back to `baseWidth`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub base_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_height: Option<f64>,
}

impl Configuration {
    /// Canvas base size `(width, height)`.
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.base_width, self.base_height.unwrap_or(self.base_width))
    }
}

/// Node kind in the design tree. Anything unrecognised becomes `Unknown`
/// and is skipped by the flattener (its children are still visited).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    Layer,
    Image,
    Text,
    #[serde(other)]
    Unknown,
}

/// One node of the nested design tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualElement {
    pub element_id: String,
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_config: Option<LayoutConfig>,
    pub style_config: StyleConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_data: Option<ContentData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_elements: Vec<VisualElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_attrs: Option<AbsoluteAttrs>,
}

/// `coord` is parent-relative; `orginCoord` (sic, as exported) is absolute.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsoluteAttrs {
    #[serde(default)]
    pub coord: Option<[f64; 2]>,
    #[serde(default, rename = "orginCoord", skip_serializing_if = "Option::is_none")]
    pub origin_coord: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub width_spec: SizeSpec,
    pub height_spec: SizeSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity_level: Option<f64>,
    /// Despite the name this is the node's fill for layers and images too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<RgbValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_config: Option<BorderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_config: Option<TextConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RgbValue {
    pub rgb_values: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<RgbValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family_rec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    /// `[horizontal token, alignment]`, e.g. `["horizontal_align_center", "center"]`.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub text_align: SmallVec<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_source: Option<String>,
}

impl VisualElement {
    fn absolute_attrs(&self) -> Option<&AbsoluteAttrs> {
        self.layout_config.as_ref()?.absolute_attrs.as_ref()
    }

    /// Absolute position override, when exported.
    pub fn origin(&self) -> Option<(f64, f64)> {
        self.absolute_attrs()?.origin_coord.map(|[x, y]| (x, y))
    }

    /// Parent-relative offset, `(0, 0)` when absent.
    pub fn offset(&self) -> (f64, f64) {
        self.absolute_attrs()
            .and_then(|a| a.coord)
            .map(|[x, y]| (x, y))
            .unwrap_or((0.0, 0.0))
    }

    pub fn size(&self) -> (f64, f64) {
        (
            self.style_config.width_spec.value,
            self.style_config.height_spec.value,
        )
    }

    /// Raw 0–255 opacity level.
    pub fn opacity_level(&self) -> Option<f64> {
        self.style_config.opacity_level
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.style_config.text_color.map(|c| c.into())
    }

    pub fn stroke_color(&self) -> Option<Color> {
        self.border()?.border_color.map(|c| c.into())
    }

    pub fn border_width(&self) -> Option<f64> {
        self.border()?.border_width
    }

    /// First corner radius; the export lists four but only uniform radii render.
    pub fn corner_radius(&self) -> Option<f64> {
        self.border()?.border_radius.as_ref()?.first().copied()
    }

    fn border(&self) -> Option<&BorderConfig> {
        self.style_config.border_config.as_ref()
    }

    pub fn text_config(&self) -> Option<&TextConfig> {
        self.style_config.text_config.as_ref()
    }

    pub fn text_value(&self) -> Option<&str> {
        self.content_data.as_ref()?.text_value.as_deref()
    }

    pub fn image_source(&self) -> Option<&str> {
        self.content_data.as_ref()?.image_source.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.element_name.as_deref()
    }

    /// A copy of this node without its subtree, kept on entities as a
    /// back-reference for export.
    pub fn detached(&self) -> VisualElement {
        VisualElement {
            child_elements: Vec::new(),
            ..self.clone()
        }
    }
}

impl From<RgbValue> for Color {
    fn from(v: RgbValue) -> Self {
        let [r, g, b] = v.rgb_values;
        Color::rgb(r, g, b)
    }
}

/// A validated import document: the raw JSON (kept verbatim for export)
/// plus the typed configuration and root element.
#[derive(Debug, Clone)]
pub struct ImportedDocument {
    pub raw: Value,
    pub configuration: Configuration,
    pub root: VisualElement,
}

impl ImportedDocument {
    /// Parse and validate import text. Nothing is returned unless both the
    /// configuration block (with `baseWidth`) and the root element exist.
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let raw: Value = serde_json::from_str(text).map_err(ImportError::Syntax)?;
        Self::from_value(raw)
    }

    /// Validate an already-parsed JSON value.
    pub fn from_value(raw: Value) -> Result<Self, ImportError> {
        let data = raw.get("data").ok_or(ImportError::MissingConfiguration)?;
        let configuration = data
            .get("configuration")
            .filter(|c| c.is_object())
            .ok_or(ImportError::MissingConfiguration)?;
        if !configuration.get("baseWidth").is_some_and(Value::is_number) {
            return Err(ImportError::MissingBaseWidth);
        }
        let root = data
            .get("visualElement")
            .filter(|v| v.is_object())
            .ok_or(ImportError::MissingVisualElement)?;

        let configuration = Configuration::deserialize(configuration)
            .map_err(ImportError::InvalidConfiguration)?;
        let root = VisualElement::deserialize(root).map_err(ImportError::InvalidElement)?;

        Ok(Self {
            raw,
            configuration,
            root,
        })
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.configuration.canvas_size()
    }
}
