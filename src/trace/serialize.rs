//! Conversion of runtime values into JSON for trace steps
//!
//! Cyclic structures are common here (linked lists under construction,
//! parent pointers) so serialization carries a seen-set of container
//! identities. A container re-entered on the current path is rendered as a
//! placeholder string; revisits on sibling paths serialize in full.

use rustc_hash::FxHashSet;

use crate::runtime::Value;

const SERIALIZE_DEPTH_LIMIT: usize = 8;

/// Serialize a runtime value to JSON, bounded in depth and cycle-safe
pub fn serialize_value(value: &Value) -> serde_json::Value {
    let mut seen = FxHashSet::default();
    serialize_inner(value, 0, &mut seen)
}

fn serialize_inner(value: &Value, depth: usize, seen: &mut FxHashSet<usize>) -> serde_json::Value {
    if depth > SERIALIZE_DEPTH_LIMIT {
        return serde_json::Value::String("...".to_string());
    }
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::Number((*n).into()),
        Value::Float(x) => match serde_json::Number::from_f64(*x) {
            Some(number) => serde_json::Value::Number(number),
            // NaN and infinities have no JSON form
            None => serde_json::Value::String(x.to_string()),
        },
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => {
            let identity = match value.identity() {
                Some(identity) => identity,
                None => return serde_json::Value::Null,
            };
            if !seen.insert(identity) {
                return serde_json::Value::String("<cycle>".to_string());
            }
            let result = match items.try_borrow() {
                Ok(items) => serde_json::Value::Array(
                    items
                        .iter()
                        .map(|item| serialize_inner(item, depth + 1, seen))
                        .collect(),
                ),
                Err(_) => serde_json::Value::String("<in use>".to_string()),
            };
            seen.remove(&identity);
            result
        }
        Value::Object(fields) => {
            let identity = match value.identity() {
                Some(identity) => identity,
                None => return serde_json::Value::Null,
            };
            if !seen.insert(identity) {
                return serde_json::Value::String("<cycle>".to_string());
            }
            let result = match fields.try_borrow() {
                Ok(fields) => {
                    let mut map = serde_json::Map::new();
                    for (key, val) in fields.iter() {
                        map.insert(key.clone(), serialize_inner(val, depth + 1, seen));
                    }
                    serde_json::Value::Object(map)
                }
                Err(_) => serde_json::Value::String("<in use>".to_string()),
            };
            seen.remove(&identity);
            result
        }
        Value::Function(func) => serde_json::Value::String(format!("<function {}>", func.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(serialize_value(&Value::Int(3)), serde_json::json!(3));
        assert_eq!(serialize_value(&Value::Null), serde_json::json!(null));
        assert_eq!(
            serialize_value(&Value::Str("x".to_string())),
            serde_json::json!("x")
        );
    }

    #[test]
    fn test_nan_becomes_string() {
        let json = serialize_value(&Value::Float(f64::NAN));
        assert!(json.is_string());
    }

    #[test]
    fn test_cycle_is_cut() {
        let list = Value::new_list(vec![Value::Int(1)]);
        if let Value::List(rc) = &list {
            rc.borrow_mut().push(list.clone());
        }
        let json = serialize_value(&list);
        assert_eq!(json, serde_json::json!([1, "<cycle>"]));
    }

    #[test]
    fn test_shared_value_serializes_fully_on_both_paths() {
        let shared = Value::new_list(vec![Value::Int(7)]);
        let outer = Value::new_list(vec![shared.clone(), shared]);
        let json = serialize_value(&outer);
        assert_eq!(json, serde_json::json!([[7], [7]]));
    }

    #[test]
    fn test_depth_limit() {
        let mut value = Value::Int(0);
        for _ in 0..20 {
            value = Value::new_list(vec![value]);
        }
        let json = serialize_value(&value);
        // bounded: the innermost levels collapse to a placeholder
        assert!(serde_json::to_string(&json).unwrap().contains("..."));
    }
}
