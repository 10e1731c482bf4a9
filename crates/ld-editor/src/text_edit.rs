//! Inline text-edit overlay.
//!
//! `Idle → Editing → (commit | cancel) → Idle`. While editing, the host
//! shows a text box at [`TextOverlay`]'s screen placement and feeds its
//! contents back through [`TextEditSession::input`]. Blur or plain Enter
//! commits, Shift+Enter inserts a newline and Escape cancels.

use crate::input::Modifiers;
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use ld_core::id::EntityId;
use ld_core::model::{Color, Entity, FontStyle, Paint, TextAlign};

/// Default overlay font size when the entity declares none.
const FALLBACK_FONT_SIZE: f64 = 16.0;

/// Screen placement and typography of the overlay text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOverlay {
    pub id: EntityId,
    pub text: String,
    /// Top-left corner in screen space.
    pub position: Point,
    /// Screen-space size (canvas size × zoom).
    pub size: Size,
    /// Degrees, clockwise about the top-left corner.
    pub rotation: f64,
    /// Font size × zoom.
    pub font_size: f64,
    pub font_family: String,
    pub font_style: FontStyle,
    pub font_weight: u16,
    pub align: TextAlign,
    pub color: Color,
}

impl TextOverlay {
    fn for_entity(entity: &Entity, text: &str, viewport: &Viewport) -> Self {
        let zoom = viewport.zoom();
        let style = &entity.style;
        Self {
            id: entity.id,
            text: text.to_owned(),
            position: viewport.to_screen(Point::new(entity.x, entity.y)),
            size: Size::new(entity.width * zoom, entity.height * zoom),
            rotation: style.rotation,
            font_size: style.font_size.unwrap_or(FALLBACK_FONT_SIZE) * zoom,
            font_family: style.font_family.clone().unwrap_or_default(),
            font_style: style.font_style.unwrap_or_default(),
            font_weight: style.font_weight.unwrap_or(400),
            align: style.align.unwrap_or_default(),
            color: match style.fill {
                Some(Paint::Solid(c)) => c,
                _ => Color::BLACK,
            },
        }
    }
}

/// How an edit ended.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Commit { id: EntityId, text: String },
    Cancel { id: EntityId },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TextEditSession {
    #[default]
    Idle,
    Editing(TextOverlay),
}

impl TextEditSession {
    pub fn overlay(&self) -> Option<&TextOverlay> {
        match self {
            Self::Idle => None,
            Self::Editing(overlay) => Some(overlay),
        }
    }

    pub fn editing_id(&self) -> Option<EntityId> {
        self.overlay().map(|o| o.id)
    }

    /// Start editing a text entity. A session already in progress is
    /// committed first and its outcome returned.
    pub fn open(&mut self, entity: &Entity, viewport: &Viewport) -> Option<EditOutcome> {
        let text = entity.text()?;
        let previous = self.commit();
        *self = Self::Editing(TextOverlay::for_entity(entity, text, viewport));
        previous
    }

    /// Follow the entity after a zoom or pan, keeping the typed text.
    pub fn reposition(&mut self, entity: &Entity, viewport: &Viewport) {
        if let Self::Editing(overlay) = self
            && overlay.id == entity.id
        {
            let text = std::mem::take(&mut overlay.text);
            *overlay = TextOverlay::for_entity(entity, &text, viewport);
        }
    }

    /// The host's text box changed.
    pub fn input(&mut self, text: &str) {
        if let Self::Editing(overlay) = self {
            overlay.text = text.to_owned();
        }
    }

    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> Option<EditOutcome> {
        match key {
            "Enter" if modifiers.shift => {
                if let Self::Editing(overlay) = self {
                    overlay.text.push('\n');
                }
                None
            }
            "Enter" => self.commit(),
            "Escape" => self.cancel(),
            _ => None,
        }
    }

    pub fn blur(&mut self) -> Option<EditOutcome> {
        self.commit()
    }

    pub fn commit(&mut self) -> Option<EditOutcome> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing(overlay) => Some(EditOutcome::Commit {
                id: overlay.id,
                text: overlay.text,
            }),
        }
    }

    pub fn cancel(&mut self) -> Option<EditOutcome> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing(overlay) => Some(EditOutcome::Cancel { id: overlay.id }),
        }
    }
}
