//! Symbols and the geometry-specific paint adapter.
//!
//! A [`Symbol`] is the paint state the engine hands to the host: a symbol
//! kind plus the channels a mapping may have filled. The setters route an
//! abstract "set color/size/opacity" instruction to the channel that makes
//! sense for the symbol's geometry, and reject combinations with no defined
//! rule.

use crate::{
    core::{Color, GeometryKind, PaintType, SizeUnit},
    error::{StyleError, StyleResult},
    expr,
    mapping::PaintValue,
};

/// Scaling context for flow symbols, passed in explicitly by the data layer
/// (the engine holds no global state).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowScale {
    pub min_width: f64,
    pub max_width: f64,
    /// Maximum flow magnitude observed in the dataset.
    pub max_magnitude: f64,
    /// Feature attribute carrying the flow magnitude.
    pub magnitude_key: String,
}

impl FlowScale {
    pub fn width_expression(&self) -> String {
        expr::flow_width(
            self.min_width,
            self.max_width,
            self.max_magnitude,
            &self.magnitude_key,
        )
    }

    pub fn outline_expression(&self) -> String {
        expr::flow_outline_width(self.max_magnitude, &self.magnitude_key)
    }
}

/// The closed catalog of symbol shapes the adapter can paint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolKind {
    /// Borderless circle for point geometries.
    Marker,
    /// Solid stroke for line geometries.
    Line,
    /// Polygon drawn as an unfilled outline.
    Outline,
    /// Borderless fill for polygon geometries.
    Fill,
    /// Composite arrow symbol for flow maps; widths always derive from the
    /// flow scale, never from mapping literals.
    ArrowFlow { scale: FlowScale },
    /// Line drawn with a gradient fill between two colors.
    GradientLine { start: Color, end: Color, width: f64 },
}

impl SymbolKind {
    pub fn geometry(&self) -> GeometryKind {
        match self {
            SymbolKind::Marker => GeometryKind::Point,
            SymbolKind::Line | SymbolKind::ArrowFlow { .. } | SymbolKind::GradientLine { .. } => {
                GeometryKind::Line
            }
            SymbolKind::Outline | SymbolKind::Fill => GeometryKind::Polygon,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Symbol {
    #[serde(flatten)]
    pub kind: SymbolKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<PaintValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<PaintValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<PaintValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_size: Option<PaintValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_unit: Option<SizeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Nested fill sub-symbol of composite symbols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_symbol: Option<Box<Symbol>>,
}

impl Symbol {
    pub fn new(kind: SymbolKind) -> Self {
        let mut symbol = Self {
            kind,
            fill_color: None,
            stroke_color: None,
            stroke_width: None,
            marker_size: None,
            size_unit: None,
            opacity: None,
            sub_symbol: None,
        };

        if let SymbolKind::ArrowFlow { scale } = &symbol.kind {
            // arrow body and head widths follow the magnitude ratio
            let width = PaintValue::Expression(scale.width_expression());

            // white outline on the nested fill, scaled by the same ratio
            let mut sub = Symbol::new(SymbolKind::Fill);
            sub.stroke_color = Some(PaintValue::Color(Color::WHITE));
            sub.stroke_width = Some(PaintValue::Expression(scale.outline_expression()));

            symbol.stroke_width = Some(width);
            symbol.sub_symbol = Some(Box::new(sub));
        }

        if let SymbolKind::GradientLine { width, .. } = &symbol.kind {
            symbol.stroke_width = Some(PaintValue::Number(*width));
        }

        symbol
    }

    pub fn geometry(&self) -> GeometryKind {
        self.kind.geometry()
    }

    pub fn set_color(&mut self, value: PaintValue) -> StyleResult<()> {
        match &mut self.kind {
            SymbolKind::Marker | SymbolKind::Fill => {
                self.fill_color = Some(value);
                Ok(())
            }
            SymbolKind::Line | SymbolKind::Outline => {
                self.stroke_color = Some(value);
                Ok(())
            }
            SymbolKind::ArrowFlow { .. } => {
                let sub = self.sub_symbol.as_mut().ok_or_else(|| {
                    StyleError::styling("arrow flow symbol is missing its fill sub-symbol")
                })?;
                sub.fill_color = Some(value);
                Ok(())
            }
            SymbolKind::GradientLine { start, .. } => match value {
                PaintValue::Color(color) => {
                    *start = color;
                    Ok(())
                }
                // no data-defined rule for gradient endpoints
                _ => Err(StyleError::unsupported_paint(
                    GeometryKind::Line,
                    PaintType::Color,
                )),
            },
        }
    }

    pub fn set_size(&mut self, value: PaintValue) -> StyleResult<()> {
        match &mut self.kind {
            SymbolKind::Marker => {
                self.marker_size = Some(value);
                Ok(())
            }
            SymbolKind::Line | SymbolKind::Outline => {
                self.stroke_width = Some(value);
                Ok(())
            }
            SymbolKind::Fill => {
                // polygons have no single linear size; documented no-op
                tracing::warn!("ignoring size paint on polygon fill symbol");
                Ok(())
            }
            SymbolKind::ArrowFlow { scale } => {
                // flow widths come from the magnitude ratio, not the mapping
                let expression = scale.width_expression();
                self.stroke_width = Some(PaintValue::Expression(expression));
                Ok(())
            }
            SymbolKind::GradientLine { width, .. } => match value {
                PaintValue::Number(x) => {
                    *width = x;
                    self.stroke_width = Some(PaintValue::Number(x));
                    Ok(())
                }
                _ => Err(StyleError::unsupported_paint(
                    GeometryKind::Line,
                    PaintType::Size,
                )),
            },
        }
    }

    pub fn set_size_unit(&mut self, unit: SizeUnit) -> StyleResult<()> {
        match &self.kind {
            SymbolKind::Marker
            | SymbolKind::Line
            | SymbolKind::Outline
            | SymbolKind::GradientLine { .. } => {
                self.size_unit = Some(unit);
                Ok(())
            }
            SymbolKind::Fill => {
                tracing::warn!("ignoring size unit on polygon fill symbol");
                Ok(())
            }
            // arrow widths are expressions in map units already
            SymbolKind::ArrowFlow { .. } => Ok(()),
        }
    }

    pub fn set_opacity(&mut self, value: f64) -> StyleResult<()> {
        self.opacity = Some(value);
        Ok(())
    }
}
