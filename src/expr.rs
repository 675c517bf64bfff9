//! Builders for host expression strings.
//!
//! The engine never evaluates these: they are opaque formulas handed to the
//! rendering host's data-defined binding mechanism, and their exact textual
//! shape is part of the output contract.

/// Filter expression of the default/else bucket in rule-list rendering.
pub const ELSE_FILTER: &str = "ELSE";

/// Format a numeric boundary the way it appears in filters and labels:
/// integral values print without a fractional part.
pub fn num(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

/// Quoted attribute reference, e.g. `"pop"`.
pub fn attribute(key: &str) -> String {
    format!("\"{key}\"")
}

/// Read a hex color from an attribute, prepending `#` when missing.
pub fn prefixed_color(key: &str) -> String {
    format!("prefixed_color(\"{key}\")")
}

/// Read an `r g b` attribute and convert it to an `r,g,b` color.
pub fn r_g_b_color(key: &str) -> String {
    format!("r_g_b_color(\"{key}\")")
}

/// Size scaling exponentially with the map zoom level, capped by a
/// per-feature magnitude read from `key`.
pub fn exp_zoom_size(key: &str) -> String {
    format!("scale_exponential(@zoom_level, 0, 20, 0, 50*sqrt((100*\"{key}\")/3.14), 2)")
}

/// Size interpolated piecewise-linearly across zoom breakpoints.
///
/// Values below the first breakpoint and above the last one are clamped to
/// the first/last paint value.
pub fn linear_zoom_size(stops: &[f64], values: &[f64]) -> String {
    let mut expr = format!(
        "CASE WHEN @zoom_level < {} THEN {} ",
        num(stops[0]),
        num(values[0])
    );

    for i in 0..stops.len() - 1 {
        expr.push_str(&format!(
            "WHEN @zoom_level BETWEEN {} AND {} THEN scale_linear(@zoom_level, {}, {}, {}, {}) ",
            num(stops[i]),
            num(stops[i + 1]),
            num(stops[i]),
            num(stops[i + 1]),
            num(values[i]),
            num(values[i + 1])
        ));
    }

    expr.push_str(&format!(
        "WHEN @zoom_level > {} THEN {} END",
        num(stops[stops.len() - 1]),
        num(values[values.len() - 1])
    ));

    expr
}

/// Filter matching one category value: `"key" IS 'value'`.
pub fn category_filter(key: &str, value: &str) -> String {
    format!("\"{key}\" IS '{value}'")
}

/// Filter for interval `index` of a continuous mapping over `intervals`.
///
/// Buckets are closed-lower/open-upper; the first and last buckets are
/// unbounded below/above.
pub fn interval_filter(key: &str, intervals: &[f64], index: usize) -> String {
    if index == 0 {
        format!("\"{key}\" < {}", num(intervals[0]))
    } else if index == intervals.len() {
        format!("\"{key}\" >= {}", num(intervals[intervals.len() - 1]))
    } else {
        format!(
            "({} <= \"{key}\") AND (\"{key}\" < {})",
            num(intervals[index - 1]),
            num(intervals[index])
        )
    }
}

/// Flow width as a ratio of the feature magnitude against the dataset
/// maximum, floored at `min_width`.
pub fn flow_width(min_width: f64, max_width: f64, max_magnitude: f64, key: &str) -> String {
    format!(
        "max({}, {}/{}*\"{key}\")",
        num(min_width),
        num(max_width),
        num(max_magnitude)
    )
}

/// Stroke width of the flow arrow outline, scaled by the same magnitude ratio.
pub fn flow_outline_width(max_magnitude: f64, key: &str) -> String {
    format!("0.2/{}*\"{key}\"", num(max_magnitude))
}
