use crate::core::{GeometryKind, MappingKind, PaintType};

pub type StyleResult<T> = Result<T, StyleError>;

#[derive(thiserror::Error, Debug)]
pub enum StyleError {
    /// Malformed or ambiguous input spec. Expected condition: surfaced to the
    /// caller that triggered styling, logged quietly.
    #[error("spec error: {0}")]
    Spec(String),

    /// A mapping kind asked to paint an aspect it does not support.
    #[error("cannot paint '{paint}' with a '{kind}' mapping")]
    IncompatiblePaint { kind: MappingKind, paint: PaintType },

    /// A geometry/paint combination with no defined rule in the paint adapter.
    #[error("no paint rule for '{paint}' on {geometry} symbols")]
    UnsupportedPaint {
        geometry: GeometryKind,
        paint: PaintType,
    },

    /// Styling invariant violation (ambiguous main mapping, bad secondary...).
    #[error("styling error: {0}")]
    Styling(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StyleError {
    pub fn spec(msg: impl Into<String>) -> Self {
        Self::Spec(msg.into())
    }

    pub fn styling(msg: impl Into<String>) -> Self {
        Self::Styling(msg.into())
    }

    pub fn incompatible_paint(kind: MappingKind, paint: PaintType) -> Self {
        Self::IncompatiblePaint { kind, paint }
    }

    pub fn unsupported_paint(geometry: GeometryKind, paint: PaintType) -> Self {
        Self::UnsupportedPaint { geometry, paint }
    }
}
