//! Engine outputs: renderers, tile style lists, labeling and feature
//! ordering, as plain data the host consumes.

use crate::{core::Color, symbol::Symbol};

/// A classification renderer for single-renderer ("classic") layers.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "renderer", rename_all = "snake_case")]
pub enum Renderer {
    /// Every feature drawn with the same symbol.
    SingleSymbol { symbol: Symbol },
    /// One symbol per discrete value of `key`, plus an optional default.
    Categorized {
        key: String,
        categories: Vec<RendererCategory>,
    },
    /// One symbol per numeric interval of `key`.
    Graduated {
        key: String,
        ranges: Vec<RendererRange>,
    },
    /// Draw nothing (label-only layers).
    Null,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RendererCategory {
    /// Matched attribute value; `None` is the default category.
    pub value: Option<String>,
    pub label: String,
    pub symbol: Symbol,
}

/// One graduated bucket. A `None` bound is genuinely unbounded, not a large
/// finite sentinel a real dataset could exceed.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RendererRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub label: String,
    pub symbol: Symbol,
}

impl RendererRange {
    /// Closed-lower/open-upper membership.
    pub fn contains(&self, x: f64) -> bool {
        self.lower.is_none_or(|lo| lo <= x) && self.upper.is_none_or(|hi| x < hi)
    }
}

/// One rule of a rule-list ("tile") layer: features matching `filter` are
/// drawn with `symbol`. A `None` filter matches everything.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TileStyle {
    pub filter: Option<String>,
    pub label: String,
    pub symbol: Symbol,
    pub enabled: bool,
}

/// Feature draw order, from a `sort` mapping.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OrderBy {
    pub key: String,
    pub ascending: bool,
}

/// Text labeling configuration for layers whose main mapping paints text.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LabelStyle {
    /// Feature attribute carrying the label text.
    pub field: String,
    pub buffer: TextBuffer,
    pub placement: LabelPlacement,
    pub allow_overlap: bool,
    pub min_zoom: Option<f64>,
    pub enabled: bool,
}

impl LabelStyle {
    /// The one labeling configuration the engine produces: white filled
    /// buffer, labels anchored over the feature point, overlap allowed.
    pub fn for_attribute(field: impl Into<String>, min_zoom: Option<f64>) -> Self {
        Self {
            field: field.into(),
            buffer: TextBuffer {
                enabled: true,
                fill_interior: true,
                color: Color::WHITE,
            },
            placement: LabelPlacement::OverPoint,
            allow_overlap: true,
            min_zoom,
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextBuffer {
    pub enabled: bool,
    pub fill_interior: bool,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPlacement {
    OverPoint,
}
