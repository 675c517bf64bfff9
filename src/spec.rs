//! Normalization of raw edit-attribute specs.
//!
//! Specs arrive as loosely-typed JSON: bare scalars standing for constant
//! mappings, deprecated field names, defaults left implicit. [`normalize`]
//! repairs all of that into a [`CanonicalSpec`] without touching the caller's
//! input. Typed parsing into a [`crate::Mapping`] happens afterwards.

use serde_json::Value;

use crate::{
    core::{MappingKind, PaintType},
    error::{StyleError, StyleResult},
};

/// A spec with every deprecated field migrated and every default resolved.
///
/// Canonical specs re-normalize to themselves, which keeps stored project
/// styles stable across repeated round-trips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanonicalSpec {
    #[serde(rename = "type")]
    pub kind: MappingKind,
    pub paint_type: PaintType,
    #[serde(default)]
    pub mapping_options: serde_json::Map<String, Value>,
    pub paint: bool,
    pub legend: bool,
    #[serde(default)]
    pub legend_options: serde_json::Map<String, Value>,
    pub editable: bool,
}

/// Normalize the raw spec stored under `edit_key`.
///
/// Pure: the input is read, never mutated.
pub fn normalize(edit_key: &str, raw: &Value) -> StyleResult<CanonicalSpec> {
    let inferred = PaintType::from_edit_key(edit_key);

    let mut obj = match raw {
        // a bare scalar is shorthand for a constant mapping
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            let paint_type = inferred.ok_or_else(|| cannot_infer(edit_key))?;

            let mut options = serde_json::Map::new();
            options.insert("value".to_string(), raw.clone());

            let mut obj = serde_json::Map::new();
            obj.insert("type".to_string(), Value::String("constant".to_string()));
            obj.insert("mapping_options".to_string(), Value::Object(options));
            obj.insert(
                "paint_type".to_string(),
                Value::String(paint_type.to_string()),
            );
            obj
        }
        Value::Object(map) => map.clone(),
        Value::Null | Value::Array(_) => {
            return Err(StyleError::spec(format!(
                "mapping spec for '{edit_key}' must be an object or a scalar"
            )));
        }
    };

    // deprecated field names
    if let Some(options) = obj.remove("mapping_data") {
        obj.insert("mapping_options".to_string(), options);
    }
    if let Some(paint_type) = obj.remove("value_type") {
        obj.insert("paint_type".to_string(), paint_type);
    }

    let kind = match obj.get("type") {
        Some(value) => serde_json::from_value::<MappingKind>(value.clone()).map_err(|_| {
            StyleError::spec(format!("unsupported mapping type '{}'", json_str(value)))
        })?,
        None => {
            return Err(StyleError::spec(format!(
                "missing 'type' field in mapping spec for '{edit_key}'"
            )));
        }
    };

    let paint_type = match obj.get("paint_type") {
        Some(value) => serde_json::from_value::<PaintType>(value.clone()).map_err(|_| {
            StyleError::spec(format!("unsupported paint type '{}'", json_str(value)))
        })?,
        None => inferred.ok_or_else(|| cannot_infer(edit_key))?,
    };

    let mapping_options = match obj.get("mapping_options") {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(StyleError::spec(format!(
                "'mapping_options' for '{edit_key}' must be an object"
            )));
        }
        None => serde_json::Map::new(),
    };

    let legend_options = match obj.get("legend_options") {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(StyleError::spec(format!(
                "'legend_options' for '{edit_key}' must be an object"
            )));
        }
        None => serde_json::Map::new(),
    };

    let paint = opt_bool(&obj, "paint", edit_key)?.unwrap_or_else(|| paint_type.paints_by_default());
    let legend = opt_bool(&obj, "legend", edit_key)?.unwrap_or(false);
    let editable = opt_bool(&obj, "editable", edit_key)?.unwrap_or(true);

    Ok(CanonicalSpec {
        kind,
        paint_type,
        mapping_options,
        paint,
        legend,
        legend_options,
        editable,
    })
}

fn opt_bool(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    edit_key: &str,
) -> StyleResult<Option<bool>> {
    match obj.get(field) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(StyleError::spec(format!(
            "'{field}' for '{edit_key}' must be a boolean"
        ))),
        None => Ok(None),
    }
}

fn cannot_infer(edit_key: &str) -> StyleError {
    StyleError::spec(format!(
        "cannot infer paint type from edit key '{edit_key}'"
    ))
}

fn json_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
