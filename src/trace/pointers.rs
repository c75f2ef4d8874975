//! Index pointer detection for linear structures
//!
//! Scans the visible variables for conventional index names (`i`, `lo`,
//! `mid`, ...) whose integer value lands inside the structure. Both 0-based
//! and 1-based interpretations are checked independently; a 1-based hit is
//! recorded at the shifted position with a suffix so the front end can label
//! it honestly.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::runtime::Value;

/// Variable names treated as candidate indices, matched case-insensitively
pub const INDEX_NAMES: &[&str] = &[
    "i", "j", "k", "left", "right", "mid", "l", "r", "m", "start", "end", "top", "bottom",
    "front", "back", "low", "high",
];

fn is_index_name(name: &str) -> bool {
    INDEX_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Map positions in a structure of length `len` to the index variables
/// currently pointing at them.
pub fn detect_pointers(
    locals: &IndexMap<String, Value>,
    len: usize,
) -> BTreeMap<usize, Vec<String>> {
    let mut pointers: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (name, value) in locals {
        if !is_index_name(name) {
            continue;
        }
        let v = match value {
            Value::Int(v) => *v,
            _ => continue,
        };
        if v >= 0 && (v as usize) < len {
            pointers.entry(v as usize).or_default().push(name.clone());
        }
        if v >= 1 && ((v - 1) as usize) < len {
            pointers
                .entry((v - 1) as usize)
                .or_default()
                .push(format!("{} (1-based)", name));
        }
    }
    pointers
}
