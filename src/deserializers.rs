//! Lenient deserializers for simulator payloads.
//!
//! The simulation backend is loosely typed: entity ids arrive as numbers or
//! strings, and numeric parameters sometimes arrive as strings. These helpers
//! coerce at the boundary so the core only ever sees one shape.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String form of an entity id, matching how the dashboard compares ids.
///
/// * strings are kept verbatim
/// * integral numbers print without a fractional part (`42.0` → `"42"`)
/// * other numbers use their shortest display form
/// * `null` and booleans print as their JSON literal
/// * arrays and objects print as compact JSON
pub fn id_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    format!("{}", f)
                }
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

/// Finite number from a JSON value; numeric strings are accepted.
pub fn finite_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Deserializes a list of ids of any scalar type into strings.
/// A missing or `null` list becomes empty.
pub fn de_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(opt
        .unwrap_or_default()
        .iter()
        .map(id_to_string)
        .collect())
}

/// Deserializes a single id of any scalar type into a string.
pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(id_to_string(&v))
}

/// Deserializes an optional integer that may arrive as a float or a string.
/// Non-finite or unparsable values become `None` rather than failing.
pub fn de_option_i64_forgiving<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    Ok(opt.as_ref().and_then(finite_number).map(|f| f.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Ids {
        #[serde(default, deserialize_with = "de_id_list")]
        ids: Vec<String>,
    }

    #[derive(Deserialize)]
    struct TopK {
        #[serde(default, deserialize_with = "de_option_i64_forgiving")]
        top_k: Option<i64>,
    }

    #[test]
    fn test_id_to_string_coerces_numbers() {
        assert_eq!(id_to_string(&json!(42)), "42");
        assert_eq!(id_to_string(&json!(42.0)), "42");
        assert_eq!(id_to_string(&json!(4.5)), "4.5");
        assert_eq!(id_to_string(&json!("42")), "42");
        assert_eq!(id_to_string(&json!(null)), "null");
    }

    #[test]
    fn test_id_list_mixed_types() {
        let parsed: Ids = serde_json::from_value(json!({"ids": [1, "b", 3.0]})).unwrap();
        assert_eq!(parsed.ids, vec!["1", "b", "3"]);
        let missing: Ids = serde_json::from_value(json!({})).unwrap();
        assert!(missing.ids.is_empty());
        let null: Ids = serde_json::from_value(json!({"ids": null})).unwrap();
        assert!(null.ids.is_empty());
    }

    #[test]
    fn test_finite_number() {
        assert_eq!(finite_number(&json!(0.25)), Some(0.25));
        assert_eq!(finite_number(&json!("0.5")), Some(0.5));
        assert_eq!(finite_number(&json!("abc")), None);
        assert_eq!(finite_number(&json!({"a": 1})), None);
        assert_eq!(finite_number(&json!("NaN")), None);
    }

    #[test]
    fn test_top_k_forgiving() {
        let a: TopK = serde_json::from_value(json!({"top_k": "7"})).unwrap();
        assert_eq!(a.top_k, Some(7));
        let b: TopK = serde_json::from_value(json!({"top_k": 9.6})).unwrap();
        assert_eq!(b.top_k, Some(10));
        let c: TopK = serde_json::from_value(json!({"top_k": "lots"})).unwrap();
        assert_eq!(c.top_k, None);
    }
}
