//! Layers and the styling orchestration: main-mapping selection, secondary
//! paint, labeling, feature ordering.

use serde_json::Value;

use crate::{
    core::{GeometryKind, MappingKind, PaintType},
    error::{StyleError, StyleResult},
    host::RenderHost,
    mapping::{Mapping, MappingRule, PaintContext},
    renderer::{LabelStyle, OrderBy},
    symbol::{Symbol, SymbolKind},
};

/// How the host renders the layer: one classification renderer, or an
/// ordered list of (filter, symbol) rules evaluated per feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Classic,
    RuleList,
}

/// Wire form of a layer, as stored in project data.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct LayerSpec {
    #[serde(default = "unnamed")]
    pub name: String,
    pub symbol: SymbolKind,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default, rename = "layerProps")]
    pub layer_props: LayerProps,
    #[serde(default, rename = "editAttributes")]
    pub edit_attributes: serde_json::Map<String, Value>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct LayerProps {
    #[serde(default)]
    pub minzoom: Option<f64>,
}

fn unnamed() -> String {
    "Unnamed".to_string()
}

/// A layer with its parsed edit attributes, in spec declaration order.
#[derive(Clone, Debug)]
pub struct Layer {
    pub name: String,
    pub template: SymbolKind,
    pub mode: RenderMode,
    pub min_zoom: Option<f64>,
    mappings: Vec<(String, Mapping)>,
}

impl Layer {
    pub fn new(name: impl Into<String>, template: SymbolKind, mode: RenderMode) -> Self {
        Self {
            name: name.into(),
            template,
            mode,
            min_zoom: None,
            mappings: Vec::new(),
        }
    }

    /// Parse a layer spec, resolving every edit attribute into a mapping.
    pub fn from_spec(spec: &LayerSpec) -> StyleResult<Self> {
        let mut layer = Layer::new(spec.name.clone(), spec.symbol.clone(), spec.mode);
        layer.min_zoom = spec.layer_props.minzoom;

        for (key, raw) in &spec.edit_attributes {
            layer = layer.with_mapping(key.clone(), Mapping::from_spec(key, raw)?)?;
        }

        Ok(layer)
    }

    pub fn with_min_zoom(mut self, min_zoom: f64) -> Self {
        self.min_zoom = Some(min_zoom);
        self
    }

    pub fn with_mapping(mut self, key: impl Into<String>, mapping: Mapping) -> StyleResult<Self> {
        let key = key.into();
        if self.mappings.iter().any(|(k, _)| *k == key) {
            return Err(StyleError::spec(format!("duplicate edit attribute '{key}'")));
        }
        self.mappings.push((key, mapping));
        Ok(self)
    }

    pub fn mappings(&self) -> &[(String, Mapping)] {
        &self.mappings
    }

    pub fn geometry(&self) -> GeometryKind {
        self.template.geometry()
    }

    /// New symbol from the layer's template, ready for painting.
    pub fn create_symbol(&self) -> Symbol {
        Symbol::new(self.template.clone())
    }
}

/// One styling pass over a layer.
///
/// Construction selects the main mapping and validates the secondaries;
/// [`LayerStyle::apply`] builds the full style state and pushes it to the
/// host in one shot. A failed pass leaves the host untouched.
#[derive(Debug)]
pub struct LayerStyle<'a> {
    layer: &'a Layer,
    main: usize,
    secondaries: Vec<usize>,
}

impl<'a> LayerStyle<'a> {
    pub fn new(layer: &'a Layer) -> StyleResult<Self> {
        let main = infer_main_mapping(&layer.mappings)?;

        let mut secondaries = Vec::new();
        for (index, (key, mapping)) in layer.mappings.iter().enumerate() {
            if index == main || !mapping.paint {
                continue;
            }
            if !matches!(mapping.kind(), MappingKind::Constant | MappingKind::Direct) {
                return Err(StyleError::styling(format!(
                    "secondary mapping '{key}' must be constant or direct"
                )));
            }
            secondaries.push(index);
        }

        Ok(Self {
            layer,
            main,
            secondaries,
        })
    }

    pub fn main_mapping(&self) -> &Mapping {
        &self.layer.mappings[self.main].1
    }

    /// Apply every secondary mapping onto `symbol`, in declaration order.
    /// Later mappings overwrite earlier ones touching the same channel.
    fn apply_secondaries(&self, symbol: &mut Symbol) -> StyleResult<()> {
        for &index in &self.secondaries {
            self.layer.mappings[index]
                .1
                .update_symbol(symbol, &PaintContext::Whole)?;
        }
        Ok(())
    }

    /// Draw order from a `sort` mapping, if the layer carries one.
    fn feature_order(&self) -> StyleResult<Option<OrderBy>> {
        for (key, mapping) in &self.layer.mappings {
            if mapping.paint_type != PaintType::Sort {
                continue;
            }
            let MappingRule::Direct(rule) = &mapping.rule else {
                return Err(StyleError::styling(format!(
                    "sort mapping '{key}' must be of kind 'direct'"
                )));
            };
            return Ok(Some(OrderBy {
                key: rule.key.clone(),
                ascending: rule.ascending.unwrap_or(true),
            }));
        }
        Ok(None)
    }

    #[tracing::instrument(skip_all, fields(layer = %self.layer.name))]
    pub fn apply(&self, host: &mut dyn RenderHost) -> StyleResult<()> {
        let main = self.main_mapping();

        // label-only layers bypass symbol painting entirely
        if main.paint_type == PaintType::Text {
            let Some(field) = main.attribute_key() else {
                return Err(StyleError::spec(
                    "text mapping requires an attribute key for labeling",
                ));
            };
            host.set_labeling(LabelStyle::for_attribute(field, self.layer.min_zoom));
            host.clear_symbology();
            return Ok(());
        }

        let order = self.feature_order()?;

        match self.layer.mode {
            RenderMode::Classic => {
                let renderer = main
                    .build_renderer(self.layer, &mut |symbol| self.apply_secondaries(symbol))?;
                host.set_renderer(renderer);
            }
            RenderMode::RuleList => {
                let mut styles = main.build_tile_styles(self.layer)?;
                for style in &mut styles {
                    self.apply_secondaries(&mut style.symbol)?;
                }
                host.set_styles(styles);
            }
        }

        if let Some(order) = order {
            host.set_feature_order(order);
        }

        Ok(())
    }
}

/// Run a full styling pass over `layer` against `host`.
pub fn style_layer(layer: &Layer, host: &mut dyn RenderHost) -> StyleResult<()> {
    LayerStyle::new(layer)?.apply(host)
}

/// Select the main mapping: a `legend` mapping wins, else the sole
/// non-constant mapping, else the sole color mapping. Non-painting mappings
/// (filter, sort) never qualify. Duplicate candidates at any tier are an
/// error regardless of declaration order.
fn infer_main_mapping(mappings: &[(String, Mapping)]) -> StyleResult<usize> {
    let mut legend = None;
    let mut non_constant = None;
    let mut color = None;

    for (index, (_, mapping)) in mappings.iter().enumerate() {
        if !mapping.paint {
            continue;
        }

        if mapping.legend {
            if legend.is_some() {
                return Err(StyleError::styling("Cannot have several 'legend' mappings"));
            }
            legend = Some(index);
        }

        if mapping.kind() != MappingKind::Constant {
            if non_constant.is_some() {
                return Err(StyleError::styling(
                    "Cannot have several 'non-constant' mappings",
                ));
            }
            non_constant = Some(index);
        }

        if mapping.paint_type == PaintType::Color {
            if color.is_some() {
                return Err(StyleError::styling("Cannot have several 'color' mappings"));
            }
            color = Some(index);
        }
    }

    legend
        .or(non_constant)
        .or(color)
        .ok_or_else(|| StyleError::styling("Could not infer main props mapping"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordedHost;
    use crate::renderer::Renderer;
    use serde_json::json;

    fn point_layer(mode: RenderMode) -> Layer {
        Layer::new("test", SymbolKind::Marker, mode)
    }

    fn m(edit_key: &str, raw: serde_json::Value) -> Mapping {
        Mapping::from_spec(edit_key, &raw).unwrap()
    }

    #[test]
    fn legend_mapping_wins_regardless_of_order() {
        let legend_spec = json!({
            "type": "continuous",
            "legend": true,
            "mapping_options": {"key": "pop", "intervals": [10], "values": [1, 2]}
        });

        let first = point_layer(RenderMode::Classic)
            .with_mapping("size", m("size", legend_spec.clone()))
            .unwrap()
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap();
        let last = point_layer(RenderMode::Classic)
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap()
            .with_mapping("size", m("size", legend_spec))
            .unwrap();

        for layer in [first, last] {
            let style = LayerStyle::new(&layer).unwrap();
            assert!(style.main_mapping().legend);
        }
    }

    #[test]
    fn sole_non_constant_mapping_is_main() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap()
            .with_mapping(
                "size",
                m("size", json!({"type": "direct", "mapping_options": {"key": "w"}})),
            )
            .unwrap();

        let style = LayerStyle::new(&layer).unwrap();
        assert_eq!(style.main_mapping().kind(), MappingKind::Direct);
    }

    #[test]
    fn sole_color_mapping_is_main_among_constants() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping("size", m("size", json!(3)))
            .unwrap()
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap();

        let style = LayerStyle::new(&layer).unwrap();
        assert_eq!(style.main_mapping().paint_type, PaintType::Color);
    }

    #[test]
    fn two_non_constant_mappings_are_ambiguous() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping(
                "color",
                m("color", json!({"type": "direct", "mapping_options": {"key": "c"}})),
            )
            .unwrap()
            .with_mapping(
                "size",
                m("size", json!({"type": "direct", "mapping_options": {"key": "w"}})),
            )
            .unwrap();

        let err = LayerStyle::new(&layer).unwrap_err();
        assert_eq!(
            err.to_string(),
            "styling error: Cannot have several 'non-constant' mappings"
        );
    }

    #[test]
    fn no_candidate_is_an_error() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping("size", m("size", json!(3)))
            .unwrap();

        let err = LayerStyle::new(&layer).unwrap_err();
        assert_eq!(
            err.to_string(),
            "styling error: Could not infer main props mapping"
        );
    }

    #[test]
    fn non_painting_mappings_never_become_main() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping(
                "filter",
                m(
                    "filter",
                    json!({"type": "enum", "mapping_options": {"key": "mode", "values": ["bus"]}}),
                ),
            )
            .unwrap()
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap();

        let style = LayerStyle::new(&layer).unwrap();
        assert_eq!(style.main_mapping().paint_type, PaintType::Color);
    }

    #[test]
    fn category_secondary_is_rejected() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping(
                "color",
                m(
                    "color",
                    json!({
                        "type": "category",
                        "legend": true,
                        "mapping_options": {"key": "s", "values_map": {"A": "#ff0000"}}
                    }),
                ),
            )
            .unwrap()
            .with_mapping(
                "size",
                m(
                    "size",
                    json!({
                        "type": "continuous",
                        "mapping_options": {"key": "pop", "intervals": [10], "values": [1, 2]}
                    }),
                ),
            )
            .unwrap();

        let err = LayerStyle::new(&layer).unwrap_err();
        assert!(err.to_string().contains("must be constant or direct"));
    }

    #[test]
    fn text_main_mapping_produces_labeling_only() {
        let layer = Layer::new("stops", SymbolKind::Marker, RenderMode::RuleList)
            .with_min_zoom(11.0)
            .with_mapping(
                "text",
                m("text", json!({"type": "direct", "mapping_options": {"key": "stop_name"}})),
            )
            .unwrap();

        let mut host = RecordedHost::default();
        style_layer(&layer, &mut host).unwrap();

        let labeling = host.labeling.expect("labeling set");
        assert_eq!(labeling.field, "stop_name");
        assert_eq!(labeling.min_zoom, Some(11.0));
        assert!(host.symbology_cleared);
        assert_eq!(host.renderer, Some(Renderer::Null));
        assert!(host.styles.is_none());
    }

    #[test]
    fn sort_mapping_sets_feature_order() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap()
            .with_mapping(
                "sort",
                m(
                    "sort",
                    json!({
                        "type": "direct",
                        "mapping_options": {"key": "route_sort_order", "ascending": false}
                    }),
                ),
            )
            .unwrap();

        let mut host = RecordedHost::default();
        style_layer(&layer, &mut host).unwrap();

        let order = host.order.expect("order set");
        assert_eq!(order.key, "route_sort_order");
        assert!(!order.ascending);
    }

    #[test]
    fn secondary_mappings_apply_in_declaration_order() {
        // both secondaries touch the size channel; the later one wins
        let layer = point_layer(RenderMode::Classic)
            .with_mapping(
                "color",
                m(
                    "color",
                    json!({
                        "type": "category",
                        "legend": true,
                        "mapping_options": {"key": "s", "values_map": {"A": "#ff0000"}}
                    }),
                ),
            )
            .unwrap()
            .with_mapping("size", m("size", json!(2)))
            .unwrap()
            .with_mapping(
                "width_override",
                m(
                    "width_override",
                    json!({
                        "type": "constant",
                        "paint_type": "size",
                        "mapping_options": {"value": 9}
                    }),
                ),
            )
            .unwrap();

        let mut host = RecordedHost::default();
        style_layer(&layer, &mut host).unwrap();

        let Some(Renderer::Categorized { categories, .. }) = host.renderer else {
            panic!("expected categorized renderer");
        };
        assert_eq!(
            categories[0].symbol.marker_size,
            Some(crate::mapping::PaintValue::Number(9.0))
        );
    }

    #[test]
    fn failed_pass_leaves_host_untouched() {
        // category secondary fails at construction, before any host call
        let layer = point_layer(RenderMode::Classic)
            .with_mapping(
                "color",
                m(
                    "color",
                    json!({
                        "type": "category",
                        "legend": true,
                        "mapping_options": {"key": "s", "values_map": {"A": "#ff0000"}}
                    }),
                ),
            )
            .unwrap()
            .with_mapping(
                "size",
                m(
                    "size",
                    json!({
                        "type": "continuous",
                        "mapping_options": {"key": "pop", "intervals": [10], "values": [1, 2]}
                    }),
                ),
            )
            .unwrap();

        let mut host = RecordedHost::default();
        assert!(style_layer(&layer, &mut host).is_err());
        assert!(host.renderer.is_none());
        assert!(host.styles.is_none());
        assert!(!host.symbology_cleared);
    }

    #[test]
    fn duplicate_edit_attribute_is_rejected() {
        let layer = point_layer(RenderMode::Classic)
            .with_mapping("color", m("color", json!("#102030")))
            .unwrap();
        assert!(layer.with_mapping("color", m("color", json!("#405060"))).is_err());
    }

    #[test]
    fn layer_spec_parses_edit_attributes_in_order() {
        let spec: LayerSpec = serde_json::from_value(json!({
            "name": "bus stops",
            "symbol": {"kind": "marker"},
            "mode": "rule_list",
            "layerProps": {"minzoom": 9},
            "editAttributes": {
                "color": "#3d6482",
                "size": 3,
                "opacity": 0.8
            }
        }))
        .unwrap();

        let layer = Layer::from_spec(&spec).unwrap();
        assert_eq!(layer.mode, RenderMode::RuleList);
        assert_eq!(layer.min_zoom, Some(9.0));
        let keys: Vec<_> = layer.mappings().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["color", "size", "opacity"]);
    }
}
