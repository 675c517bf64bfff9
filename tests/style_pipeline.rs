use cartostyle::{
    Color, Layer, LayerSpec, PaintValue, RecordedHost, RenderMode, Renderer, Symbol, SymbolKind,
    style_layer,
};

fn load_layer(json: &str) -> Layer {
    let spec: LayerSpec = serde_json::from_str(json).unwrap();
    Layer::from_spec(&spec).unwrap()
}

fn styled(json: &str) -> RecordedHost {
    let layer = load_layer(json);
    let mut host = RecordedHost::default();
    style_layer(&layer, &mut host).unwrap();
    host
}

#[test]
fn constant_point_layer_renders_a_single_literal_symbol() {
    let host = styled(include_str!("data/airports.json"));

    let Some(Renderer::SingleSymbol { symbol }) = host.renderer else {
        panic!("expected a single-symbol renderer");
    };
    assert_eq!(
        symbol.fill_color,
        Some(PaintValue::Color(Color::from_hex("#3d6482").unwrap()))
    );
    assert_eq!(symbol.marker_size, Some(PaintValue::Number(3.0)));
    assert_eq!(symbol.opacity, Some(0.8));
}

#[test]
fn category_layer_produces_filtered_styles_with_else_bucket() {
    let host = styled(include_str!("data/bus_routes.json"));

    let styles = host.styles.expect("tile styles set");
    assert_eq!(styles.len(), 3);

    assert_eq!(styles[0].filter.as_deref(), Some("\"status\" IS 'A'"));
    assert_eq!(styles[0].label, "Active");
    assert_eq!(
        styles[0].symbol.stroke_color,
        Some(PaintValue::Color(Color::from_hex("#ff0000").unwrap()))
    );

    assert_eq!(styles[1].filter.as_deref(), Some("\"status\" IS 'B'"));
    assert_eq!(styles[1].label, "Backup");
    assert_eq!(
        styles[1].symbol.stroke_color,
        Some(PaintValue::Color(Color::from_hex("#00ff00").unwrap()))
    );

    assert_eq!(styles[2].filter.as_deref(), Some("ELSE"));
    assert_eq!(styles[2].label, "Default");
    assert_eq!(
        styles[2].symbol.stroke_color,
        Some(PaintValue::Color(Color::from_hex("#888888").unwrap()))
    );

    // the constant size secondary is layered on every bucket
    for style in &styles {
        assert_eq!(style.symbol.stroke_width, Some(PaintValue::Number(2.0)));
    }

    // and the sort mapping orders features
    let order = host.order.expect("order set");
    assert_eq!(order.key, "route_sort_order");
    assert!(!order.ascending);
}

#[test]
fn continuous_size_layer_matches_interval_contract() {
    let layer_json = r##"{
        "name": "cities",
        "symbol": {"kind": "marker"},
        "mode": "rule_list",
        "editAttributes": {
            "size": {
                "type": "continuous",
                "mapping_options": {"key": "pop", "intervals": [10, 100], "values": [1, 2, 3]}
            }
        }
    }"##;
    let host = styled(layer_json);

    let styles = host.styles.expect("tile styles set");
    assert_eq!(styles.len(), 3);

    assert_eq!(styles[0].filter.as_deref(), Some("\"pop\" < 10"));
    assert_eq!(styles[0].label, "Moins de 10");
    assert_eq!(styles[0].symbol.marker_size, Some(PaintValue::Number(1.0)));

    assert_eq!(
        styles[1].filter.as_deref(),
        Some("(10 <= \"pop\") AND (\"pop\" < 100)")
    );
    assert_eq!(styles[1].label, "10 à 100");
    assert_eq!(styles[1].symbol.marker_size, Some(PaintValue::Number(2.0)));

    assert_eq!(styles[2].filter.as_deref(), Some("\"pop\" >= 100"));
    assert_eq!(styles[2].label, "Plus de 100");
    assert_eq!(styles[2].symbol.marker_size, Some(PaintValue::Number(3.0)));
}

#[test]
fn continuous_classic_layer_covers_all_reals() {
    let layer_json = r##"{
        "name": "cities",
        "symbol": {"kind": "marker"},
        "mode": "classic",
        "editAttributes": {
            "size": {
                "type": "continuous",
                "mapping_options": {"key": "pop", "intervals": [10, 100], "values": [1, 2, 3]}
            }
        }
    }"##;
    let host = styled(layer_json);

    let Some(Renderer::Graduated { key, ranges }) = host.renderer else {
        panic!("expected a graduated renderer");
    };
    assert_eq!(key, "pop");
    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[0].lower, None);
    assert_eq!(ranges[2].upper, None);

    // every value falls in exactly one range, including extremes the old
    // ±100000 sentinels would have missed
    for x in [f64::MIN, -2e6, -1.0, 0.0, 9.999, 10.0, 99.9, 100.0, 5e8, f64::MAX] {
        let hits = ranges.iter().filter(|r| r.contains(x)).count();
        assert_eq!(hits, 1, "x = {x}");
    }
}

#[test]
fn palette_continuous_layer_styles_with_named_ramp() {
    let host = styled(include_str!("data/density.json"));

    let styles = host.styles.expect("tile styles set");
    assert_eq!(styles.len(), 7);

    assert_eq!(
        styles[0].symbol.fill_color,
        Some(PaintValue::Color(Color::from_hex("#EFE3CF").unwrap()))
    );
    assert_eq!(
        styles[6].symbol.fill_color,
        Some(PaintValue::Color(Color::from_hex("#D03568").unwrap()))
    );

    assert_eq!(styles[0].label, "Moins de 10 hab/km²");
    assert_eq!(styles[6].label, "Plus de 1000 hab/km²");

    // the constant opacity secondary is layered on every bucket
    for style in &styles {
        assert_eq!(style.symbol.opacity, Some(0.7));
    }
}

#[test]
fn ambiguous_main_mapping_fails_with_styling_error() {
    let layer_json = r##"{
        "name": "broken",
        "symbol": {"kind": "marker"},
        "mode": "classic",
        "editAttributes": {
            "color": {"type": "direct", "mapping_options": {"key": "c"}},
            "size": {"type": "direct", "mapping_options": {"key": "w"}}
        }
    }"##;

    let layer = load_layer(layer_json);
    let mut host = RecordedHost::default();
    let err = style_layer(&layer, &mut host).unwrap_err();
    assert_eq!(
        err.to_string(),
        "styling error: Cannot have several 'non-constant' mappings"
    );
    assert!(host.renderer.is_none());
    assert!(host.styles.is_none());
}

#[test]
fn label_layer_gets_labeling_and_no_symbols() {
    let host = styled(include_str!("data/stop_labels.json"));

    let labeling = host.labeling.expect("labeling set");
    assert_eq!(labeling.field, "stop_name");
    assert_eq!(labeling.min_zoom, Some(11.0));
    assert!(labeling.buffer.enabled);
    assert_eq!(labeling.buffer.color, Color::WHITE);
    assert!(host.symbology_cleared);
}

#[test]
fn flow_layer_paints_the_nested_arrow_fill() {
    let layer_json = r##"{
        "name": "commuter flows",
        "symbol": {
            "kind": "arrow_flow",
            "scale": {
                "min_width": 0.5,
                "max_width": 6,
                "max_magnitude": 1800,
                "magnitude_key": "count"
            }
        },
        "mode": "classic",
        "editAttributes": {
            "color": "#3d6482",
            "sort": {"type": "direct", "mapping_options": {"key": "count"}}
        }
    }"##;
    let host = styled(layer_json);

    let Some(Renderer::SingleSymbol { symbol }) = host.renderer else {
        panic!("expected a single-symbol renderer");
    };

    // widths are derived from the magnitude ratio
    assert_eq!(
        symbol.stroke_width,
        Some(PaintValue::Expression(
            "max(0.5, 6/1800*\"count\")".to_string()
        ))
    );

    // the color mapping lands on the nested fill
    let sub = symbol.sub_symbol.as_deref().expect("nested fill");
    assert_eq!(
        sub.fill_color,
        Some(PaintValue::Color(Color::from_hex("#3d6482").unwrap()))
    );
    assert_eq!(sub.stroke_color, Some(PaintValue::Color(Color::WHITE)));

    let order = host.order.expect("order set");
    assert_eq!(order.key, "count");
    assert!(order.ascending);
}

#[test]
fn direct_color_layer_binds_an_expression() {
    let layer_json = r##"{
        "name": "routes",
        "symbol": {"kind": "line"},
        "mode": "classic",
        "editAttributes": {
            "color": {"type": "direct", "mapping_options": {"key": "route_color"}},
            "size": 1.5
        }
    }"##;
    let host = styled(layer_json);

    let Some(Renderer::SingleSymbol { symbol }) = host.renderer else {
        panic!("expected a single-symbol renderer");
    };
    assert_eq!(
        symbol.stroke_color,
        Some(PaintValue::Expression(
            "prefixed_color(\"route_color\")".to_string()
        ))
    );
    assert_eq!(symbol.stroke_width, Some(PaintValue::Number(1.5)));
}

#[test]
fn category_renderer_buckets_match_tile_buckets() {
    // the same mapping drives both target modes with identical bucket shape
    let spec = r##"{
        "type": "category",
        "legend": true,
        "mapping_options": {
            "key": "status",
            "values_map": {"A": "#ff0000", "B": "#00ff00"},
            "default": "#888888"
        }
    }"##;
    let raw: serde_json::Value = serde_json::from_str(spec).unwrap();
    let mapping = cartostyle::Mapping::from_spec("color", &raw).unwrap();

    let classic = Layer::new("x", SymbolKind::Marker, RenderMode::Classic)
        .with_mapping("color", mapping.clone())
        .unwrap();
    let renderer = mapping
        .build_renderer(&classic, &mut |_: &mut Symbol| Ok(()))
        .unwrap();
    let Renderer::Categorized { categories, .. } = renderer else {
        panic!("expected categorized renderer");
    };
    let styles = mapping.build_tile_styles(&classic).unwrap();

    assert_eq!(categories.len(), styles.len());
    for (category, style) in categories.iter().zip(&styles) {
        assert_eq!(category.label, style.label);
        assert_eq!(category.symbol.fill_color, style.symbol.fill_color);
    }
    assert_eq!(categories[2].value, None);
}

#[test]
fn default_bucket_can_be_disabled() {
    let layer_json = r##"{
        "name": "statuses",
        "symbol": {"kind": "marker"},
        "mode": "rule_list",
        "editAttributes": {
            "color": {
                "type": "category",
                "mapping_options": {
                    "key": "status",
                    "values_map": {"A": "#ff0000", "B": "#00ff00"},
                    "default_bucket": false
                }
            }
        }
    }"##;
    let host = styled(layer_json);

    let styles = host.styles.expect("tile styles set");
    assert_eq!(styles.len(), 2);
    assert!(styles.iter().all(|s| s.filter.as_deref() != Some("ELSE")));
}

#[test]
fn canonical_specs_renormalize_to_themselves() {
    for fixture in [
        include_str!("data/airports.json"),
        include_str!("data/bus_routes.json"),
        include_str!("data/density.json"),
        include_str!("data/stop_labels.json"),
    ] {
        let spec: LayerSpec = serde_json::from_str(fixture).unwrap();
        for (key, raw) in &spec.edit_attributes {
            let once = cartostyle::normalize(key, raw).unwrap();
            let again =
                cartostyle::normalize(key, &serde_json::to_value(&once).unwrap()).unwrap();
            assert_eq!(once, again, "edit attribute '{key}'");
        }
    }
}

#[test]
fn zoom_interpolated_size_survives_the_whole_pipeline() {
    let layer_json = r##"{
        "name": "stations",
        "symbol": {"kind": "marker"},
        "mode": "classic",
        "editAttributes": {
            "color": "#102030",
            "size": {
                "type": "linear_zoom_interpolation",
                "mapping_options": {
                    "interpolation_values": [8, 12, 16],
                    "paint_values": [1, 3, 8]
                }
            }
        }
    }"##;
    let host = styled(layer_json);

    let Some(Renderer::SingleSymbol { symbol }) = host.renderer else {
        panic!("expected a single-symbol renderer");
    };
    let Some(PaintValue::Expression(expr)) = &symbol.marker_size else {
        panic!("expected a data-defined size");
    };
    assert!(expr.starts_with("CASE WHEN @zoom_level < 8 THEN 1"));
    assert!(expr.contains("scale_linear(@zoom_level, 12, 16, 3, 8)"));
    assert!(expr.ends_with("WHEN @zoom_level > 16 THEN 8 END"));
}

#[test]
fn enum_filter_mapping_exposes_selection_and_never_paints() {
    let layer_json = r##"{
        "name": "transit",
        "symbol": {"kind": "line"},
        "mode": "rule_list",
        "editAttributes": {
            "color": "#102030",
            "filter": {
                "type": "enum",
                "mapping_options": {"key": "mode", "values": ["bus", "tram"]}
            }
        }
    }"##;
    let layer = load_layer(layer_json);

    let (_, filter_mapping) = layer
        .mappings()
        .iter()
        .find(|(k, _)| k == "filter")
        .unwrap();
    let (key, values) = filter_mapping.filter_selection().unwrap();
    assert_eq!(key, "mode");
    assert_eq!(values, ["bus".to_string(), "tram".to_string()]);

    // styling ignores the non-painting filter mapping
    let mut host = RecordedHost::default();
    style_layer(&layer, &mut host).unwrap();
    assert_eq!(host.styles.unwrap().len(), 1);
}
