use std::fmt;

use crate::error::{StyleError, StyleResult};

/// Geometry families the paint adapter knows how to style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Polygon => "polygon",
        };
        f.write_str(s)
    }
}

/// Paint aspect targeted by a mapping.
///
/// `Filter` and `Sort` do not paint anything: they select and order features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintType {
    Color,
    Size,
    Opacity,
    Text,
    Filter,
    Sort,
}

impl PaintType {
    /// Infer the paint type from the edit-attribute key a spec is stored under.
    pub fn from_edit_key(key: &str) -> Option<Self> {
        match key {
            "color" => Some(Self::Color),
            "size" => Some(Self::Size),
            "opacity" => Some(Self::Opacity),
            "text" => Some(Self::Text),
            "filter" => Some(Self::Filter),
            "sort" => Some(Self::Sort),
            _ => None,
        }
    }

    /// Whether a mapping of this paint type participates in visual paint
    /// when the spec does not say otherwise.
    pub fn paints_by_default(self) -> bool {
        !matches!(self, Self::Filter | Self::Sort)
    }
}

impl fmt::Display for PaintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaintType::Color => "color",
            PaintType::Size => "size",
            PaintType::Opacity => "opacity",
            PaintType::Text => "text",
            PaintType::Filter => "filter",
            PaintType::Sort => "sort",
        };
        f.write_str(s)
    }
}

/// Mapping kinds, using the wire names of the spec format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    Constant,
    Direct,
    Category,
    Continuous,
    ExpZoomInterpolation,
    LinearZoomInterpolation,
    Enum,
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MappingKind::Constant => "constant",
            MappingKind::Direct => "direct",
            MappingKind::Category => "category",
            MappingKind::Continuous => "continuous",
            MappingKind::ExpZoomInterpolation => "exp_zoom_interpolation",
            MappingKind::LinearZoomInterpolation => "linear_zoom_interpolation",
            MappingKind::Enum => "enum",
        };
        f.write_str(s)
    }
}

/// Physical unit for symbol sizes.
///
/// Sizes set through a mapping are always normalized to points so that
/// zoom-independent sizing stays consistent across mapping kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Points,
    Millimeters,
    Pixels,
}

/// 8-bit straight RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color. The leading `#` is optional (attribute data often
    /// carries bare hex digits); `rgb`, `rrggbb` and `rrggbbaa` forms are
    /// accepted.
    pub fn from_hex(s: &str) -> StyleResult<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.is_ascii() {
            return Err(StyleError::spec(format!("invalid hex color '{s}'")));
        }

        let parse = |chunk: &str| -> StyleResult<u8> {
            u8::from_str_radix(chunk, 16)
                .map_err(|_| StyleError::spec(format!("invalid hex color '{s}'")))
        };

        match digits.len() {
            3 => {
                let r = parse(&digits[0..1])?;
                let g = parse(&digits[1..2])?;
                let b = parse(&digits[2..3])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Ok(Self::rgb(
                parse(&digits[0..2])?,
                parse(&digits[2..4])?,
                parse(&digits[4..6])?,
            )),
            8 => Ok(Self {
                r: parse(&digits[0..2])?,
                g: parse(&digits[2..4])?,
                b: parse(&digits[4..6])?,
                a: parse(&digits[6..8])?,
            }),
            _ => Err(StyleError::spec(format!("invalid hex color '{s}'"))),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::Deserialize as _;

        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
