//! Trace data model
//!
//! A trace is a flat list of [`Step`]s, one per observable event, already in
//! the JSON shape the visualization front end consumes. Optional fields are
//! omitted from the JSON entirely when absent rather than serialized as null,
//! except inside [`Visual`] payloads where nulls are structural (a list
//! node's missing `next`, a leaf's missing children).

pub mod classify;
pub mod pointers;
pub mod recorder;
pub mod serialize;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

pub use classify::{detect_visuals, ClassifyError, FocusPolicy};
pub use pointers::detect_pointers;
pub use recorder::StepRecorder;
pub use serialize::serialize_value;

/// Hard cap on recorded steps per run
pub const MAX_STEPS: usize = 1000;

/// Number of trailing output characters kept per step
pub const OUTPUT_TAIL: usize = 1000;

/// One frame of the call stack as reported in a step, outermost first
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CallFrame {
    pub function: String,
    pub filename: String,
    pub line_number: usize,
}

/// A single trace step
#[derive(Debug, Clone, Default, Serialize)]
pub struct Step {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_args: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_stack: Option<Vec<CallFrame>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(rename = "operationValue", skip_serializing_if = "Option::is_none")]
    pub operation_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalars: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visuals: Option<Vec<Visual>>,
    /// First entry of `visuals`, kept for older front ends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<Visual>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_vars: Option<Vec<String>>,
}

/// The detected kind of a visualized structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualKind {
    Array,
    Stack,
    Queue,
    LinkedList,
    BinaryTree,
    GeneralTree,
    Grid,
}

/// One node of a rendered linked list
#[derive(Debug, Clone, Serialize)]
pub struct ListNodeRecord {
    pub id: usize,
    pub value: serde_json::Value,
    pub next: Option<usize>,
}

/// One node of a rendered binary tree, nested
#[derive(Debug, Clone, Serialize)]
pub struct BinaryNodeRecord {
    pub id: usize,
    pub value: serde_json::Value,
    pub left: Option<Box<BinaryNodeRecord>>,
    pub right: Option<Box<BinaryNodeRecord>>,
}

/// A labeled edge to a general tree child
#[derive(Debug, Clone, Serialize)]
pub struct LabeledChild {
    pub label: String,
    pub node: GeneralNodeRecord,
}

/// One node of a rendered general tree, nested. Nodes carry no value of
/// their own; values live on the labeled edges (trie-style).
#[derive(Debug, Clone, Serialize)]
pub struct GeneralNodeRecord {
    pub id: usize,
    pub children: Vec<LabeledChild>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TreeRoot {
    Binary(BinaryNodeRecord),
    General(GeneralNodeRecord),
}

/// Pointer annotations: positional indices for linear structures and trees,
/// or named cells for grids.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Pointers {
    Index(BTreeMap<usize, Vec<String>>),
    Cell(BTreeMap<String, (usize, usize)>),
}

/// Marked cell of a grid
#[derive(Debug, Clone, Serialize)]
pub struct CellState {
    pub row: usize,
    pub col: usize,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece: Option<String>,
}

/// One detected structure, in render-ready form
#[derive(Debug, Clone, Serialize)]
pub struct Visual {
    #[serde(rename = "type")]
    pub kind: VisualKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<ListNodeRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<TreeRoot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointers: Option<Pointers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cols: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(rename = "cellStates", skip_serializing_if = "Option::is_none")]
    pub cell_states: Option<Vec<CellState>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<Vec<(usize, usize)>>>,
}

impl Visual {
    /// Empty visual of a given kind; detectors fill in the payload fields
    pub fn new(kind: VisualKind, name: impl Into<String>) -> Self {
        Visual {
            kind,
            name: name.into(),
            values: None,
            nodes: None,
            root: None,
            pointers: None,
            rows: None,
            cols: None,
            cells: None,
            cell_states: None,
            paths: None,
        }
    }
}

/// Steps shared between the worker thread and the sandbox
pub type SharedSteps = Arc<Mutex<Vec<Step>>>;

/// Append-only capture of everything the snippet printed.
///
/// Shared between the interpreter (writer) and the recorder (reader); a
/// poisoned lock is recovered rather than propagated since the buffer
/// holds plain text.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<String>>);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&self, s: &str) {
        match self.0.lock() {
            Ok(mut buffer) => buffer.push_str(s),
            Err(poisoned) => poisoned.into_inner().push_str(s),
        }
    }

    /// Last `max_chars` characters of the captured output
    pub fn tail(&self, max_chars: usize) -> String {
        let buffer = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = buffer.chars().count();
        if count <= max_chars {
            buffer.clone()
        } else {
            buffer.chars().skip(count - max_chars).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_omits_absent_fields() {
        let step = Step {
            line: Some(3),
            error: Some("boom".to_string()),
            ..Step::default()
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({"line": 3, "error": "boom"}));
    }

    #[test]
    fn test_visual_kind_serialization() {
        let json = serde_json::to_value(VisualKind::LinkedList).unwrap();
        assert_eq!(json, serde_json::json!("linked-list"));
        let json = serde_json::to_value(VisualKind::BinaryTree).unwrap();
        assert_eq!(json, serde_json::json!("binary-tree"));
    }

    #[test]
    fn test_list_node_next_serializes_null() {
        let node = ListNodeRecord {
            id: 0,
            value: serde_json::json!(1),
            next: None,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({"id": 0, "value": 1, "next": null}));
    }

    #[test]
    fn test_output_tail_is_char_safe() {
        let output = OutputBuffer::new();
        output.push_str("héllo wörld");
        assert_eq!(output.tail(5), "wörld");
        assert_eq!(output.tail(100), "héllo wörld");
    }

    #[test]
    fn test_index_pointers_serialize_with_string_keys() {
        let mut map = BTreeMap::new();
        map.insert(2usize, vec!["i".to_string()]);
        let json = serde_json::to_value(Pointers::Index(map)).unwrap();
        assert_eq!(json, serde_json::json!({"2": ["i"]}));
    }
}
