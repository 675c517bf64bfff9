//! The mapping model: classification of canonical specs into a closed set of
//! mapping kinds, paint-value resolution, and renderer/tile-style building.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    core::{Color, MappingKind, PaintType, SizeUnit},
    error::{StyleError, StyleResult},
    expr,
    layer::Layer,
    renderer::{Renderer, RendererCategory, RendererRange, TileStyle},
    spec::{CanonicalSpec, normalize},
    symbol::Symbol,
};

/// Label of the default/else bucket of a category mapping.
pub const DEFAULT_LABEL: &str = "Default";

/// Fallback paints used by the default bucket when the spec gives no
/// explicit `default` value.
pub const DEFAULT_MAPPING_COLOR: &str = "#bababa";
pub const DEFAULT_MAPPING_SIZE: f64 = 1.0;
pub const DEFAULT_MAPPING_OPACITY: f64 = 1.0;

const POPULATION_DENSITIES_COLORS: [&str; 7] = [
    "#EFE3CF", "#F7C99E", "#F9AF79", "#F79465", "#E8705D", "#D4495A", "#D03568",
];

/// Color ramps a continuous mapping may reference by name instead of
/// spelling out its `values` array.
pub fn named_palette(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "population_densities_colors" => Some(&POPULATION_DENSITIES_COLORS),
        _ => None,
    }
}

/// A raw paint datum from a spec: a hex color string, a number, a label...
/// Interpretation depends on the mapping's paint type.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PaintScalar {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl PaintScalar {
    fn from_json(value: &Value) -> StyleResult<Self> {
        match value {
            Value::Number(n) => {
                let x = n
                    .as_f64()
                    .ok_or_else(|| StyleError::spec(format!("paint value {n} is not finite")))?;
                Ok(Self::Number(x))
            }
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            other => Err(StyleError::spec(format!(
                "paint value must be a scalar, got {other}"
            ))),
        }
    }
}

/// A resolved paint: either a literal the host can set directly, or an
/// expression it must bind through its data-defined mechanism.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PaintValue {
    Color(Color),
    Number(f64),
    Text(String),
    Expression(String),
}

/// Which bucket of the mapping is being evaluated. `Whole` for context-free
/// kinds (constant, direct, zoom interpolations).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PaintContext {
    #[default]
    Whole,
    /// A category bucket; `None` is the default/else bucket.
    Category(Option<String>),
    /// Interval index into a continuous mapping's buckets.
    Interval(usize),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LegendOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One paint rule bound to a layer edit attribute, immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Mapping {
    pub paint_type: PaintType,
    /// Whether this mapping participates in visual paint (filter/sort
    /// mappings default to `false`).
    pub paint: bool,
    pub legend: bool,
    pub legend_options: LegendOptions,
    pub editable: bool,
    pub rule: MappingRule,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MappingRule {
    Constant(ConstantRule),
    Direct(DirectRule),
    Category(CategoryRule),
    Continuous(ContinuousRule),
    ExpZoomInterpolation(ExpZoomRule),
    LinearZoomInterpolation(LinearZoomRule),
    Enum(EnumRule),
}

impl MappingRule {
    pub fn kind(&self) -> MappingKind {
        match self {
            MappingRule::Constant(_) => MappingKind::Constant,
            MappingRule::Direct(_) => MappingKind::Direct,
            MappingRule::Category(_) => MappingKind::Category,
            MappingRule::Continuous(_) => MappingKind::Continuous,
            MappingRule::ExpZoomInterpolation(_) => MappingKind::ExpZoomInterpolation,
            MappingRule::LinearZoomInterpolation(_) => MappingKind::LinearZoomInterpolation,
            MappingRule::Enum(_) => MappingKind::Enum,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantRule {
    pub value: PaintScalar,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectRule {
    pub key: String,
    /// Color encoding of the attribute: hex-with-optional-`#` when unset,
    /// `"r g b"` for space-separated components, `"raw"` unimplemented.
    pub format: Option<String>,
    /// Sort direction when this rule backs a `sort` mapping.
    pub ascending: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryEntry {
    pub value: String,
    pub paint: PaintScalar,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryRule {
    pub key: String,
    /// Buckets in spec declaration order.
    pub entries: Vec<CategoryEntry>,
    pub labels: BTreeMap<String, String>,
    pub default: Option<PaintScalar>,
    /// Whether to emit the default/else bucket.
    pub default_bucket: bool,
}

impl CategoryRule {
    pub fn label_for(&self, value: &str) -> String {
        self.labels
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }

    fn default_paint(&self, paint_type: PaintType) -> StyleResult<PaintScalar> {
        if let Some(default) = &self.default {
            return Ok(default.clone());
        }
        match paint_type {
            PaintType::Color => Ok(PaintScalar::Text(DEFAULT_MAPPING_COLOR.to_string())),
            PaintType::Size => Ok(PaintScalar::Number(DEFAULT_MAPPING_SIZE)),
            PaintType::Opacity => Ok(PaintScalar::Number(DEFAULT_MAPPING_OPACITY)),
            other => Err(StyleError::incompatible_paint(MappingKind::Category, other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousRule {
    pub key: String,
    /// Strictly ascending interior boundaries; buckets are
    /// closed-lower/open-upper with unbounded first/last buckets.
    pub intervals: Vec<f64>,
    /// One paint per bucket: `intervals.len() + 1` entries.
    pub values: Vec<PaintScalar>,
}

impl ContinuousRule {
    pub fn bucket_count(&self) -> usize {
        self.intervals.len() + 1
    }

    /// The single bucket `x` falls into.
    pub fn bucket_index(&self, x: f64) -> usize {
        self.intervals.iter().position(|&b| x < b).unwrap_or(self.intervals.len())
    }

    /// `(lower, upper)` bounds of bucket `index`; `None` is unbounded.
    pub fn bounds(&self, index: usize) -> (Option<f64>, Option<f64>) {
        let lower = (index > 0).then(|| self.intervals[index - 1]);
        let upper = (index < self.intervals.len()).then(|| self.intervals[index]);
        (lower, upper)
    }

    fn interval_label(&self, index: usize, unit: Option<&str>) -> String {
        let mut label = if index == 0 {
            format!("Moins de {}", expr::num(self.intervals[0]))
        } else if index == self.intervals.len() {
            format!("Plus de {}", expr::num(self.intervals[self.intervals.len() - 1]))
        } else {
            format!(
                "{} à {}",
                expr::num(self.intervals[index - 1]),
                expr::num(self.intervals[index])
            )
        };

        if let Some(unit) = unit {
            label.push(' ');
            label.push_str(unit);
        }

        label
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpZoomRule {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearZoomRule {
    pub interpolation_values: Vec<f64>,
    pub paint_values: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumRule {
    pub key: String,
    pub values: Vec<String>,
}

impl Mapping {
    /// Parse the raw spec stored under `edit_key` into a validated mapping.
    pub fn from_spec(edit_key: &str, raw: &Value) -> StyleResult<Self> {
        Self::from_canonical(normalize(edit_key, raw)?)
    }

    pub fn from_canonical(spec: CanonicalSpec) -> StyleResult<Self> {
        let options = &spec.mapping_options;

        let rule = match spec.kind {
            MappingKind::Constant => {
                let value = req_scalar(options, "value")?;
                if spec.paint_type == PaintType::Opacity {
                    let PaintScalar::Number(x) = &value else {
                        return Err(StyleError::spec("opacity value must be a number"));
                    };
                    if !(0.0..=1.0).contains(x) {
                        return Err(StyleError::spec(format!(
                            "opacity value {x} is out of [0, 1]"
                        )));
                    }
                }
                MappingRule::Constant(ConstantRule {
                    value,
                    label: opt_str(options, "label")?,
                })
            }
            MappingKind::Direct => MappingRule::Direct(DirectRule {
                key: req_str(options, "key")?,
                format: opt_str(options, "format")?,
                ascending: opt_bool(options, "ascending")?,
            }),
            MappingKind::Category => {
                let entries = req_object(options, "values_map")?
                    .iter()
                    .map(|(value, paint)| {
                        Ok(CategoryEntry {
                            value: value.clone(),
                            paint: PaintScalar::from_json(paint)?,
                        })
                    })
                    .collect::<StyleResult<Vec<_>>>()?;
                if entries.is_empty() {
                    return Err(StyleError::spec("'values_map' must not be empty"));
                }

                let labels = match options.get("values_labels") {
                    Some(Value::Object(map)) => map
                        .iter()
                        .map(|(value, label)| match label {
                            Value::String(s) => Ok((value.clone(), s.clone())),
                            other => Err(StyleError::spec(format!(
                                "label for category '{value}' must be a string, got {other}"
                            ))),
                        })
                        .collect::<StyleResult<BTreeMap<_, _>>>()?,
                    Some(_) => {
                        return Err(StyleError::spec("'values_labels' must be an object"));
                    }
                    None => BTreeMap::new(),
                };

                MappingRule::Category(CategoryRule {
                    key: req_str(options, "key")?,
                    entries,
                    labels,
                    default: opt_scalar(options, "default")?,
                    default_bucket: opt_bool(options, "default_bucket")?.unwrap_or(true),
                })
            }
            MappingKind::Continuous => {
                let intervals = req_f64_array(options, "intervals")?;
                if intervals.is_empty() {
                    return Err(StyleError::spec("'intervals' must not be empty"));
                }
                if intervals.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(StyleError::spec("'intervals' must be strictly ascending"));
                }

                let values = match options.get("values") {
                    // a palette referenced by name
                    Some(Value::String(name)) => named_palette(name)
                        .ok_or_else(|| {
                            StyleError::spec(format!("unknown palette '{name}'"))
                        })?
                        .iter()
                        .map(|hex| PaintScalar::Text((*hex).to_string()))
                        .collect(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(PaintScalar::from_json)
                        .collect::<StyleResult<Vec<_>>>()?,
                    Some(other) => {
                        return Err(StyleError::spec(format!(
                            "'values' must be an array or a palette name, got {other}"
                        )));
                    }
                    None => return Err(StyleError::spec("missing mapping option 'values'")),
                };

                if values.len() != intervals.len() + 1 {
                    return Err(StyleError::spec(format!(
                        "continuous mapping needs {} values for {} intervals, got {}",
                        intervals.len() + 1,
                        intervals.len(),
                        values.len()
                    )));
                }

                MappingRule::Continuous(ContinuousRule {
                    key: req_str(options, "key")?,
                    intervals,
                    values,
                })
            }
            MappingKind::ExpZoomInterpolation => MappingRule::ExpZoomInterpolation(ExpZoomRule {
                key: req_str(options, "key")?,
            }),
            MappingKind::LinearZoomInterpolation => {
                let stops = req_f64_array(options, "interpolation_values")?;
                let values = req_f64_array(options, "paint_values")?;
                if stops.len() < 2 {
                    return Err(StyleError::spec(
                        "'interpolation_values' needs at least two zoom breakpoints",
                    ));
                }
                if stops.len() != values.len() {
                    return Err(StyleError::spec(format!(
                        "'paint_values' must match 'interpolation_values' length ({} != {})",
                        values.len(),
                        stops.len()
                    )));
                }
                if stops.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(StyleError::spec(
                        "'interpolation_values' must be strictly ascending",
                    ));
                }
                MappingRule::LinearZoomInterpolation(LinearZoomRule {
                    interpolation_values: stops,
                    paint_values: values,
                })
            }
            MappingKind::Enum => {
                let values = match options.get("values") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => Ok(s.clone()),
                            Value::Number(n) => Ok(n.to_string()),
                            other => Err(StyleError::spec(format!(
                                "enum value must be a string or number, got {other}"
                            ))),
                        })
                        .collect::<StyleResult<Vec<_>>>()?,
                    Some(other) => {
                        return Err(StyleError::spec(format!(
                            "mapping option 'values' must be an array, got {other}"
                        )));
                    }
                    None => return Err(StyleError::spec("missing mapping option 'values'")),
                };
                MappingRule::Enum(EnumRule {
                    key: req_str(options, "key")?,
                    values,
                })
            }
        };

        Ok(Mapping {
            paint_type: spec.paint_type,
            paint: spec.paint,
            legend: spec.legend,
            legend_options: serde_json::from_value(Value::Object(spec.legend_options))
                .map_err(|e| StyleError::spec(format!("invalid legend options: {e}")))?,
            editable: spec.editable,
            rule,
        })
    }

    pub fn kind(&self) -> MappingKind {
        self.rule.kind()
    }

    /// The feature attribute this mapping reads, if any.
    pub fn attribute_key(&self) -> Option<&str> {
        match &self.rule {
            MappingRule::Constant(_) | MappingRule::LinearZoomInterpolation(_) => None,
            MappingRule::Direct(rule) => Some(&rule.key),
            MappingRule::Category(rule) => Some(&rule.key),
            MappingRule::Continuous(rule) => Some(&rule.key),
            MappingRule::ExpZoomInterpolation(rule) => Some(&rule.key),
            MappingRule::Enum(rule) => Some(&rule.key),
        }
    }

    /// Feature selection carried by an enum mapping: `(key, accepted values)`.
    pub fn filter_selection(&self) -> Option<(&str, &[String])> {
        match &self.rule {
            MappingRule::Enum(rule) => Some((&rule.key, &rule.values)),
            _ => None,
        }
    }

    /// Resolve the paint for the given bucket context.
    ///
    /// The flag tells the caller whether the value is an expression that must
    /// go through the host's data-defined binding instead of a plain setter.
    pub fn resolve_paint_value(&self, ctx: &PaintContext) -> StyleResult<(PaintValue, bool)> {
        match &self.rule {
            MappingRule::Constant(rule) => {
                Ok((self.scalar_paint(&rule.value)?, false))
            }
            MappingRule::Direct(rule) => {
                let expression = match self.paint_type {
                    PaintType::Color => match rule.format.as_deref() {
                        Some("raw") => {
                            tracing::warn!(key = %rule.key, "color format 'raw' is not implemented");
                            "0,0,0".to_string()
                        }
                        Some("r g b") => expr::r_g_b_color(&rule.key),
                        _ => expr::prefixed_color(&rule.key),
                    },
                    PaintType::Size => expr::attribute(&rule.key),
                    other => {
                        return Err(StyleError::incompatible_paint(MappingKind::Direct, other));
                    }
                };
                Ok((PaintValue::Expression(expression), true))
            }
            MappingRule::Category(rule) => {
                let PaintContext::Category(value) = ctx else {
                    return Err(StyleError::styling(
                        "category mapping resolved without a category context",
                    ));
                };
                let scalar = match value {
                    Some(v) => rule
                        .entries
                        .iter()
                        .find(|entry| entry.value == *v)
                        .map(|entry| entry.paint.clone())
                        .ok_or_else(|| {
                            StyleError::spec(format!("no category paint for value '{v}'"))
                        })?,
                    None => rule.default_paint(self.paint_type)?,
                };
                Ok((self.scalar_paint(&scalar)?, false))
            }
            MappingRule::Continuous(rule) => {
                let PaintContext::Interval(index) = *ctx else {
                    return Err(StyleError::styling(
                        "continuous mapping resolved without an interval context",
                    ));
                };
                let scalar = rule.values.get(index).ok_or_else(|| {
                    StyleError::styling(format!(
                        "interval index {index} out of range for {} buckets",
                        rule.bucket_count()
                    ))
                })?;
                Ok((self.scalar_paint(scalar)?, false))
            }
            MappingRule::ExpZoomInterpolation(rule) => {
                if self.paint_type != PaintType::Size {
                    return Err(StyleError::incompatible_paint(
                        MappingKind::ExpZoomInterpolation,
                        self.paint_type,
                    ));
                }
                Ok((PaintValue::Expression(expr::exp_zoom_size(&rule.key)), true))
            }
            MappingRule::LinearZoomInterpolation(rule) => {
                if self.paint_type != PaintType::Size {
                    return Err(StyleError::incompatible_paint(
                        MappingKind::LinearZoomInterpolation,
                        self.paint_type,
                    ));
                }
                let expression =
                    expr::linear_zoom_size(&rule.interpolation_values, &rule.paint_values);
                Ok((PaintValue::Expression(expression), true))
            }
            MappingRule::Enum(_) => {
                Err(StyleError::incompatible_paint(MappingKind::Enum, self.paint_type))
            }
        }
    }

    fn scalar_paint(&self, scalar: &PaintScalar) -> StyleResult<PaintValue> {
        match self.paint_type {
            PaintType::Color => match scalar {
                PaintScalar::Text(s) => Ok(PaintValue::Color(Color::from_hex(s)?)),
                other => Err(StyleError::spec(format!(
                    "color paint value must be a hex string, got {other:?}"
                ))),
            },
            PaintType::Size | PaintType::Opacity => match scalar {
                PaintScalar::Number(x) => Ok(PaintValue::Number(*x)),
                other => Err(StyleError::spec(format!(
                    "{} paint value must be a number, got {other:?}",
                    self.paint_type
                ))),
            },
            PaintType::Text => match scalar {
                PaintScalar::Text(s) => Ok(PaintValue::Text(s.clone())),
                other => Err(StyleError::spec(format!(
                    "text paint value must be a string, got {other:?}"
                ))),
            },
            other => Err(StyleError::incompatible_paint(self.kind(), other)),
        }
    }

    /// Paint `symbol` for the given bucket context.
    pub fn update_symbol(&self, symbol: &mut Symbol, ctx: &PaintContext) -> StyleResult<()> {
        match self.paint_type {
            PaintType::Opacity => {
                if self.kind() != MappingKind::Constant {
                    return Err(StyleError::incompatible_paint(self.kind(), PaintType::Opacity));
                }
                let (value, _) = self.resolve_paint_value(ctx)?;
                let PaintValue::Number(x) = value else {
                    return Err(StyleError::spec("opacity value must be a number"));
                };
                symbol.set_opacity(x)
            }
            PaintType::Color => {
                let (value, _) = self.resolve_paint_value(ctx)?;
                symbol.set_color(value)
            }
            PaintType::Size => {
                let (value, _) = self.resolve_paint_value(ctx)?;
                symbol.set_size(value)?;
                symbol.set_size_unit(SizeUnit::Points)
            }
            other => Err(StyleError::incompatible_paint(self.kind(), other)),
        }
    }

    /// Legend label for the given bucket context, when the mapping has one.
    pub fn label(&self, ctx: &PaintContext) -> Option<String> {
        match (&self.rule, ctx) {
            (MappingRule::Constant(rule), _) => rule.label.clone(),
            (MappingRule::Category(rule), PaintContext::Category(Some(value))) => {
                Some(rule.label_for(value))
            }
            (MappingRule::Category(_), PaintContext::Category(None)) => {
                Some(DEFAULT_LABEL.to_string())
            }
            (MappingRule::Continuous(rule), PaintContext::Interval(index)) => {
                Some(rule.interval_label(*index, self.legend_options.unit.as_deref()))
            }
            _ => None,
        }
    }

    /// Build the renderer for a single-renderer ("classic") layer where this
    /// mapping is the main mapping.
    ///
    /// Each bucket's symbol is painted by this mapping first, then passed
    /// through `apply_secondary` so secondary mappings can layer additional
    /// paint on it.
    pub fn build_renderer(
        &self,
        layer: &Layer,
        apply_secondary: &mut dyn FnMut(&mut Symbol) -> StyleResult<()>,
    ) -> StyleResult<Renderer> {
        match &self.rule {
            MappingRule::Category(rule) => {
                let mut categories = Vec::with_capacity(rule.entries.len() + 1);

                for entry in &rule.entries {
                    let ctx = PaintContext::Category(Some(entry.value.clone()));
                    let mut symbol = layer.create_symbol();
                    self.update_symbol(&mut symbol, &ctx)?;
                    apply_secondary(&mut symbol)?;

                    categories.push(RendererCategory {
                        value: Some(entry.value.clone()),
                        label: rule.label_for(&entry.value),
                        symbol,
                    });
                }

                if rule.default_bucket {
                    let ctx = PaintContext::Category(None);
                    let mut symbol = layer.create_symbol();
                    self.update_symbol(&mut symbol, &ctx)?;
                    apply_secondary(&mut symbol)?;

                    categories.push(RendererCategory {
                        value: None,
                        label: DEFAULT_LABEL.to_string(),
                        symbol,
                    });
                }

                Ok(Renderer::Categorized {
                    key: rule.key.clone(),
                    categories,
                })
            }
            MappingRule::Continuous(rule) => {
                let mut ranges = Vec::with_capacity(rule.bucket_count());

                for index in 0..rule.bucket_count() {
                    let ctx = PaintContext::Interval(index);
                    let mut symbol = layer.create_symbol();
                    self.update_symbol(&mut symbol, &ctx)?;
                    apply_secondary(&mut symbol)?;

                    let (lower, upper) = rule.bounds(index);
                    ranges.push(RendererRange {
                        lower,
                        upper,
                        label: rule.interval_label(index, self.legend_options.unit.as_deref()),
                        symbol,
                    });
                }

                Ok(Renderer::Graduated {
                    key: rule.key.clone(),
                    ranges,
                })
            }
            MappingRule::Enum(_) => {
                Err(StyleError::incompatible_paint(MappingKind::Enum, self.paint_type))
            }
            // constant, direct and zoom-interpolation mappings render with a
            // single symbol
            _ => {
                let mut symbol = layer.create_symbol();
                self.update_symbol(&mut symbol, &PaintContext::Whole)?;
                apply_secondary(&mut symbol)?;
                Ok(Renderer::SingleSymbol { symbol })
            }
        }
    }

    /// Build the ordered rule list for a tile ("rule-list") layer where this
    /// mapping is the main mapping. Secondary paint is applied by the caller
    /// over every produced style.
    pub fn build_tile_styles(&self, layer: &Layer) -> StyleResult<Vec<TileStyle>> {
        match &self.rule {
            MappingRule::Category(rule) => {
                let mut styles = Vec::with_capacity(rule.entries.len() + 1);

                for entry in &rule.entries {
                    let ctx = PaintContext::Category(Some(entry.value.clone()));
                    let mut symbol = layer.create_symbol();
                    self.update_symbol(&mut symbol, &ctx)?;

                    styles.push(TileStyle {
                        filter: Some(expr::category_filter(&rule.key, &entry.value)),
                        label: rule.label_for(&entry.value),
                        symbol,
                        enabled: true,
                    });
                }

                if rule.default_bucket {
                    let ctx = PaintContext::Category(None);
                    let mut symbol = layer.create_symbol();
                    self.update_symbol(&mut symbol, &ctx)?;

                    styles.push(TileStyle {
                        filter: Some(expr::ELSE_FILTER.to_string()),
                        label: DEFAULT_LABEL.to_string(),
                        symbol,
                        enabled: true,
                    });
                }

                Ok(styles)
            }
            MappingRule::Continuous(rule) => {
                let mut styles = Vec::with_capacity(rule.bucket_count());

                for index in 0..rule.bucket_count() {
                    let ctx = PaintContext::Interval(index);
                    let mut symbol = layer.create_symbol();
                    self.update_symbol(&mut symbol, &ctx)?;

                    styles.push(TileStyle {
                        filter: Some(expr::interval_filter(&rule.key, &rule.intervals, index)),
                        label: rule.interval_label(index, self.legend_options.unit.as_deref()),
                        symbol,
                        enabled: true,
                    });
                }

                Ok(styles)
            }
            MappingRule::Enum(_) => {
                Err(StyleError::incompatible_paint(MappingKind::Enum, self.paint_type))
            }
            _ => {
                let mut symbol = layer.create_symbol();
                self.update_symbol(&mut symbol, &PaintContext::Whole)?;

                Ok(vec![TileStyle {
                    filter: None,
                    label: self.label(&PaintContext::Whole).unwrap_or_default(),
                    symbol,
                    enabled: true,
                }])
            }
        }
    }
}

// option parsing helpers

fn req_str(options: &serde_json::Map<String, Value>, field: &str) -> StyleResult<String> {
    match options.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(StyleError::spec(format!(
            "mapping option '{field}' must be a string, got {other}"
        ))),
        None => Err(StyleError::spec(format!("missing mapping option '{field}'"))),
    }
}

fn opt_str(options: &serde_json::Map<String, Value>, field: &str) -> StyleResult<Option<String>> {
    match options.get(field) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(StyleError::spec(format!(
            "mapping option '{field}' must be a string, got {other}"
        ))),
        None => Ok(None),
    }
}

fn opt_bool(options: &serde_json::Map<String, Value>, field: &str) -> StyleResult<Option<bool>> {
    match options.get(field) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(StyleError::spec(format!(
            "mapping option '{field}' must be a boolean, got {other}"
        ))),
        None => Ok(None),
    }
}

fn req_scalar(options: &serde_json::Map<String, Value>, field: &str) -> StyleResult<PaintScalar> {
    options
        .get(field)
        .ok_or_else(|| StyleError::spec(format!("missing mapping option '{field}'")))
        .and_then(PaintScalar::from_json)
}

fn opt_scalar(
    options: &serde_json::Map<String, Value>,
    field: &str,
) -> StyleResult<Option<PaintScalar>> {
    options.get(field).map(PaintScalar::from_json).transpose()
}

fn req_object<'a>(
    options: &'a serde_json::Map<String, Value>,
    field: &str,
) -> StyleResult<&'a serde_json::Map<String, Value>> {
    match options.get(field) {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(StyleError::spec(format!(
            "mapping option '{field}' must be an object, got {other}"
        ))),
        None => Err(StyleError::spec(format!("missing mapping option '{field}'"))),
    }
}

fn req_f64_array(options: &serde_json::Map<String, Value>, field: &str) -> StyleResult<Vec<f64>> {
    match options.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_f64().ok_or_else(|| {
                    StyleError::spec(format!(
                        "mapping option '{field}' must contain only numbers, got {item}"
                    ))
                })
            })
            .collect(),
        Some(other) => Err(StyleError::spec(format!(
            "mapping option '{field}' must be an array, got {other}"
        ))),
        None => Err(StyleError::spec(format!("missing mapping option '{field}'"))),
    }
}
