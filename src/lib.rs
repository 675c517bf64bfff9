#![forbid(unsafe_code)]

//! Declarative style-mapping engine for geographic data layers.
//!
//! Raw "edit attribute" specs (loose JSON) are normalized, classified into a
//! closed set of mapping kinds, and turned into the paint state a rendering
//! host consumes: classification renderers, rule lists, labeling, and feature
//! ordering.
//!
//! The pipeline is explicitly staged:
//!
//! 1. Normalize the raw spec: [`normalize`]
//! 2. Parse it into an immutable rule: [`Mapping::from_spec`]
//! 3. Run the styling pass: [`style_layer`] / [`LayerStyle::apply`]

pub mod core;
pub mod error;
pub mod expr;
pub mod host;
pub mod layer;
pub mod mapping;
pub mod renderer;
pub mod spec;
pub mod symbol;

pub use crate::core::{Color, GeometryKind, MappingKind, PaintType, SizeUnit};
pub use crate::error::{StyleError, StyleResult};
pub use crate::host::{RecordedHost, RenderHost};
pub use crate::layer::{Layer, LayerSpec, LayerStyle, RenderMode, style_layer};
pub use crate::mapping::{Mapping, MappingRule, PaintContext, PaintValue};
pub use crate::renderer::{
    LabelStyle, OrderBy, Renderer, RendererCategory, RendererRange, TileStyle,
};
pub use crate::spec::{CanonicalSpec, normalize};
pub use crate::symbol::{FlowScale, Symbol, SymbolKind};
