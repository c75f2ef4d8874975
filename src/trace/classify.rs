//! Heuristic structure detection
//!
//! Inspects the visible variables of a step and produces render-ready
//! [`Visual`]s for the structures it recognizes: arrays, stacks, queues,
//! linked lists, binary and general trees, heaps shown as trees, and grids.
//! Recognition is by name and shape only; nothing in the snippet opts in.
//!
//! All container access goes through `try_borrow` and every traversal is
//! bounded, so a hostile or cyclic structure degrades to an error the
//! recorder can report instead of wedging the trace.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::runtime::Value;
use crate::trace::pointers::detect_pointers;
use crate::trace::serialize::serialize_value;
use crate::trace::{
    BinaryNodeRecord, CellState, GeneralNodeRecord, LabeledChild, ListNodeRecord, Pointers,
    TreeRoot, Visual, VisualKind,
};

/// How far into nested objects list discovery descends
const DISCOVERY_DEPTH_LIMIT: usize = 4;

/// Maximum nodes rendered for one linked list
const LINKED_LIST_NODE_LIMIT: usize = 20;

/// Maximum depth of a heap rendered as a tree (at most 2^5 - 1 nodes)
const HEAP_TREE_DEPTH_LIMIT: usize = 5;

/// Recursion bound for explicit tree structures
const TREE_DEPTH_LIMIT: usize = 32;

const PIECE_CHARS: &[&str] = &["Q", "K", "N", "B", "R", "P"];

/// Which structure kind wins when several are present at once. A heap shown
/// as a tree normally suppresses the flat array views of the same data, and
/// a queue suppresses stacks and arrays.
#[derive(Debug, Clone, Copy)]
pub struct FocusPolicy {
    pub heap_tree_first: bool,
    pub queue_first: bool,
}

impl Default for FocusPolicy {
    fn default() -> Self {
        FocusPolicy {
            heap_tree_first: true,
            queue_first: true,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    #[error("structure inspection failed: value is borrowed mid-mutation")]
    Borrowed,
}

type ListRef = Rc<RefCell<Vec<Value>>>;

struct Candidate {
    name: String,
    list: ListRef,
    is_stack: bool,
}

/// Detect visualizable structures among `locals`.
///
/// `current_function` is the name of the innermost user function, used to
/// treat lists touched inside `push`/`pop`/`peek` as stacks even when their
/// names say nothing.
pub fn detect_visuals(
    locals: &IndexMap<String, Value>,
    current_function: Option<&str>,
    policy: FocusPolicy,
) -> Result<Vec<Visual>, ClassifyError> {
    let mut visuals = Vec::new();

    linear_visuals(locals, current_function, &mut visuals)?;
    linked_list_visuals(locals, &mut visuals)?;
    general_tree_visuals(locals, &mut visuals)?;
    binary_tree_visuals(locals, &mut visuals)?;
    heap_visuals(locals, &mut visuals)?;
    grid_visuals(locals, &mut visuals)?;

    let has_heap_tree = visuals
        .iter()
        .any(|v| v.kind == VisualKind::BinaryTree && v.name.to_lowercase().contains("heap"));
    if policy.heap_tree_first && has_heap_tree {
        visuals
            .retain(|v| v.kind == VisualKind::BinaryTree && v.name.to_lowercase().contains("heap"));
    } else if policy.queue_first && visuals.iter().any(|v| v.kind == VisualKind::Queue) {
        visuals.retain(|v| v.kind == VisualKind::Queue);
    }

    Ok(visuals)
}

// ========== Arrays, stacks, queues ==========

fn linear_visuals(
    locals: &IndexMap<String, Value>,
    current_function: Option<&str>,
    visuals: &mut Vec<Visual>,
) -> Result<(), ClassifyError> {
    let mut named_lists: Vec<(String, ListRef)> = Vec::new();
    let mut seen_objects = FxHashSet::default();
    for (name, value) in locals {
        if name.starts_with("__") {
            continue;
        }
        find_lists(value, name, &mut named_lists, &mut seen_objects, 0)?;
    }

    let in_mutator = matches!(
        current_function.map(str::to_lowercase).as_deref(),
        Some("push" | "pop" | "peek")
    );

    // one visual per unique list, under its best name
    let mut by_identity: IndexMap<usize, Candidate> = IndexMap::new();
    for (name, list) in named_lists {
        let identity = Rc::as_ptr(&list) as usize;
        let is_stack = name.to_lowercase().contains("stack") || in_mutator;
        match by_identity.entry(identity) {
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(Candidate { name, list, is_stack });
            }
            indexmap::map::Entry::Occupied(mut entry) => {
                let prev = entry.get_mut();
                if better_name(&name, is_stack, &prev.name, prev.is_stack) {
                    prev.name = name;
                    prev.is_stack = is_stack;
                }
            }
        }
    }

    for candidate in by_identity.values() {
        let items = candidate.list.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
        let kind = if candidate.name.to_lowercase().contains("queue") {
            VisualKind::Queue
        } else if candidate.is_stack {
            VisualKind::Stack
        } else {
            VisualKind::Array
        };
        let mut visual = Visual::new(kind, candidate.name.clone());
        visual.values = Some(items.iter().map(serialize_value).collect());
        let pointers = detect_pointers(locals, items.len());
        if !pointers.is_empty() {
            visual.pointers = Some(Pointers::Index(pointers));
        }
        visuals.push(visual);
    }
    Ok(())
}

/// A stack-flavored name beats a plain one, a dot-free name beats a nested
/// path, and between peers the shorter name wins.
fn better_name(name: &str, is_stack: bool, prev_name: &str, prev_is_stack: bool) -> bool {
    if is_stack != prev_is_stack {
        return is_stack;
    }
    let top_level = !name.contains('.');
    let prev_top_level = !prev_name.contains('.');
    if top_level != prev_top_level {
        return top_level;
    }
    name.len() < prev_name.len()
}

/// Collect every reachable list together with its dotted access path.
/// Descends into objects but not into list elements.
fn find_lists(
    value: &Value,
    path: &str,
    found: &mut Vec<(String, ListRef)>,
    seen_objects: &mut FxHashSet<usize>,
    depth: usize,
) -> Result<(), ClassifyError> {
    if depth > DISCOVERY_DEPTH_LIMIT {
        return Ok(());
    }
    match value {
        Value::List(list) => {
            found.push((path.to_string(), list.clone()));
        }
        Value::Object(fields) => {
            if let Some(identity) = value.identity() {
                if !seen_objects.insert(identity) {
                    return Ok(());
                }
            }
            let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
            for (key, child) in fields.iter() {
                if key.starts_with("__") {
                    continue;
                }
                let child_path = format!("{}.{}", path, key);
                find_lists(child, &child_path, found, seen_objects, depth + 1)?;
            }
        }
        _ => {}
    }
    Ok(())
}

// ========== Linked lists ==========

fn is_list_node(value: &Value) -> Result<bool, ClassifyError> {
    match value {
        Value::Object(fields) => {
            let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
            Ok(fields.contains_key("val") && fields.contains_key("next"))
        }
        _ => Ok(false),
    }
}

fn linked_list_visuals(
    locals: &IndexMap<String, Value>,
    visuals: &mut Vec<Visual>,
) -> Result<(), ClassifyError> {
    for (name, value) in locals {
        if !is_list_node(value)? {
            continue;
        }
        let mut nodes = Vec::new();
        let mut pointer_map: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut seen = FxHashSet::default();
        let mut current = value.clone();
        let mut node_id = 0usize;

        loop {
            let fields = match &current {
                Value::Object(fields) => fields.clone(),
                _ => break,
            };
            let identity = match current.identity() {
                Some(identity) => identity,
                None => break,
            };
            if !seen.insert(identity) {
                break;
            }
            let (val, next) = {
                let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
                if !(fields.contains_key("val") && fields.contains_key("next")) {
                    break;
                }
                (
                    fields.get("val").cloned().unwrap_or(Value::Null),
                    fields.get("next").cloned().unwrap_or(Value::Null),
                )
            };
            nodes.push(ListNodeRecord {
                id: node_id,
                value: serialize_value(&val),
                next: if next.is_truthy() { Some(node_id + 1) } else { None },
            });
            for (other_name, other_value) in locals {
                if other_value.identity() == Some(identity) {
                    pointer_map
                        .entry(node_id)
                        .or_default()
                        .push(other_name.clone());
                }
            }
            current = next;
            node_id += 1;
            if node_id > LINKED_LIST_NODE_LIMIT {
                break;
            }
        }

        if nodes.len() > 1 {
            let mut visual = Visual::new(VisualKind::LinkedList, name.clone());
            visual.nodes = Some(nodes);
            visual.pointers = Some(Pointers::Index(pointer_map));
            visuals.push(visual);
        }
    }
    Ok(())
}

// ========== Trees ==========

fn general_tree_visuals(
    locals: &IndexMap<String, Value>,
    visuals: &mut Vec<Visual>,
) -> Result<(), ClassifyError> {
    for (name, value) in locals {
        let has_children_object = match value {
            Value::Object(fields) => {
                let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
                matches!(fields.get("children"), Some(Value::Object(_)))
            }
            _ => false,
        };
        if !has_children_object {
            continue;
        }
        let mut counter = 0usize;
        let mut seen = FxHashSet::default();
        if let Some(root) = general_node(value, &mut counter, &mut seen, 0)? {
            let mut visual = Visual::new(VisualKind::GeneralTree, name.clone());
            visual.root = Some(TreeRoot::General(root));
            visuals.push(visual);
        }
    }
    Ok(())
}

fn general_node(
    value: &Value,
    counter: &mut usize,
    seen: &mut FxHashSet<usize>,
    depth: usize,
) -> Result<Option<GeneralNodeRecord>, ClassifyError> {
    if depth > TREE_DEPTH_LIMIT {
        return Ok(None);
    }
    let fields = match value {
        Value::Object(fields) => fields,
        _ => return Ok(None),
    };
    let identity = match value.identity() {
        Some(identity) => identity,
        None => return Ok(None),
    };
    if !seen.insert(identity) {
        return Ok(None);
    }
    let id = *counter;
    *counter += 1;

    let child_entries: Vec<(String, Value)> = {
        let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
        match fields.get("children") {
            Some(Value::Object(children)) => children
                .try_borrow()
                .map_err(|_| ClassifyError::Borrowed)?
                .iter()
                .map(|(label, child)| (label.clone(), child.clone()))
                .collect(),
            _ => Vec::new(),
        }
    };

    let mut children = Vec::new();
    for (label, child) in child_entries {
        if let Some(node) = general_node(&child, counter, seen, depth + 1)? {
            children.push(LabeledChild { label, node });
        }
    }
    Ok(Some(GeneralNodeRecord { id, children }))
}

fn binary_tree_visuals(
    locals: &IndexMap<String, Value>,
    visuals: &mut Vec<Visual>,
) -> Result<(), ClassifyError> {
    for (name, value) in locals {
        let is_tree_node = match value {
            Value::Object(fields) => {
                let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
                fields.contains_key("left")
                    && fields.contains_key("right")
                    && fields.contains_key("val")
            }
            _ => false,
        };
        if !is_tree_node {
            continue;
        }
        let mut counter = 0usize;
        let mut seen = FxHashSet::default();
        if let Some(root) = binary_node(value, &mut counter, &mut seen, 0)? {
            let mut visual = Visual::new(VisualKind::BinaryTree, name.clone());
            visual.root = Some(TreeRoot::Binary(root));
            visuals.push(visual);
        }
    }
    Ok(())
}

fn binary_node(
    value: &Value,
    counter: &mut usize,
    seen: &mut FxHashSet<usize>,
    depth: usize,
) -> Result<Option<BinaryNodeRecord>, ClassifyError> {
    if depth > TREE_DEPTH_LIMIT {
        return Ok(None);
    }
    let fields = match value {
        Value::Object(fields) => fields,
        _ => return Ok(None),
    };
    let identity = match value.identity() {
        Some(identity) => identity,
        None => return Ok(None),
    };
    if !seen.insert(identity) {
        return Ok(None);
    }
    let id = *counter;
    *counter += 1;

    let (val, left, right) = {
        let fields = fields.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
        (
            fields.get("val").cloned().unwrap_or(Value::Null),
            fields.get("left").cloned().unwrap_or(Value::Null),
            fields.get("right").cloned().unwrap_or(Value::Null),
        )
    };
    Ok(Some(BinaryNodeRecord {
        id,
        value: serialize_value(&val),
        left: binary_node(&left, counter, seen, depth + 1)?.map(Box::new),
        right: binary_node(&right, counter, seen, depth + 1)?.map(Box::new),
    }))
}

// ========== Heaps ==========

fn heap_visuals(
    locals: &IndexMap<String, Value>,
    visuals: &mut Vec<Visual>,
) -> Result<(), ClassifyError> {
    for (name, value) in locals {
        let items = match value {
            Value::List(items) if name.to_lowercase().contains("heap") => {
                items.try_borrow().map_err(|_| ClassifyError::Borrowed)?
            }
            _ => continue,
        };
        if items.is_empty() {
            continue;
        }
        let mut counter = 0usize;
        let mut index_to_id: BTreeMap<usize, usize> = BTreeMap::new();
        let root = heap_node(&items, 0, &mut counter, 0, &mut index_to_id);
        let root = match root {
            Some(root) => root,
            None => continue,
        };
        // index pointers are remapped onto the preorder node ids
        let array_pointers = detect_pointers(locals, items.len());
        let mut tree_pointers: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (index, names) in array_pointers {
            if let Some(&id) = index_to_id.get(&index) {
                tree_pointers.entry(id).or_default().extend(names);
            }
        }
        let mut visual = Visual::new(VisualKind::BinaryTree, format!("{} (as tree)", name));
        visual.root = Some(TreeRoot::Binary(root));
        visual.pointers = Some(Pointers::Index(tree_pointers));
        visuals.push(visual);
    }
    Ok(())
}

fn heap_node(
    items: &[Value],
    index: usize,
    counter: &mut usize,
    depth: usize,
    index_to_id: &mut BTreeMap<usize, usize>,
) -> Option<BinaryNodeRecord> {
    if depth >= HEAP_TREE_DEPTH_LIMIT || index >= items.len() {
        return None;
    }
    let id = *counter;
    *counter += 1;
    index_to_id.insert(index, id);
    Some(BinaryNodeRecord {
        id,
        value: serialize_value(&items[index]),
        left: heap_node(items, 2 * index + 1, counter, depth + 1, index_to_id).map(Box::new),
        right: heap_node(items, 2 * index + 2, counter, depth + 1, index_to_id).map(Box::new),
    })
}

// ========== Grids ==========

fn grid_visuals(
    locals: &IndexMap<String, Value>,
    visuals: &mut Vec<Visual>,
) -> Result<(), ClassifyError> {
    for (name, value) in locals {
        let items = match value {
            Value::List(items) => items.try_borrow().map_err(|_| ClassifyError::Borrowed)?,
            _ => continue,
        };
        if items.is_empty() {
            continue;
        }

        if items.iter().all(|row| matches!(row, Value::List(_))) {
            if let Some(visual) = nested_list_grid(name, &items, locals)? {
                visuals.push(visual);
            }
        } else if items.iter().all(|row| matches!(row, Value::Str(_))) {
            if let Some(visual) = string_board_grid(name, &items)? {
                visuals.push(visual);
            }
        }
    }
    Ok(())
}

/// Rectangular list of lists: full grid with pointers and paths
fn nested_list_grid(
    name: &str,
    items: &[Value],
    locals: &IndexMap<String, Value>,
) -> Result<Option<Visual>, ClassifyError> {
    let mut rows_data: Vec<Vec<Value>> = Vec::with_capacity(items.len());
    for row in items {
        match row {
            Value::List(cells) => {
                let cells = cells.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
                rows_data.push(cells.to_vec());
            }
            _ => return Ok(None),
        }
    }
    let cols = rows_data[0].len();
    if rows_data.iter().any(|row| row.len() != cols) {
        return Ok(None);
    }
    let rows = rows_data.len();

    let mut cell_states = Vec::new();
    for (r, row) in rows_data.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Value::Str(s) => {
                    if PIECE_CHARS.contains(&s.as_str()) {
                        cell_states.push(CellState {
                            row: r,
                            col: c,
                            state: "piece".to_string(),
                            piece: Some(s.clone()),
                        });
                    } else if s == "X" {
                        cell_states.push(CellState {
                            row: r,
                            col: c,
                            state: "blocked".to_string(),
                            piece: None,
                        });
                    }
                }
                Value::Int(1) | Value::Bool(true) => cell_states.push(CellState {
                    row: r,
                    col: c,
                    state: "visited".to_string(),
                    piece: None,
                }),
                _ => {}
            }
        }
    }

    let mut pointers: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (k, v) in locals {
        if let Some((r, c)) = as_cell_pair(v)? {
            if r < rows && c < cols {
                pointers.insert(k.clone(), (r, c));
            }
        }
    }
    if let (Some(Value::Int(r)), Some(Value::Int(c))) = (locals.get("row"), locals.get("col")) {
        if *r >= 0 && *c >= 0 && (*r as usize) < rows && (*c as usize) < cols {
            pointers.insert("row,col".to_string(), (*r as usize, *c as usize));
        }
    }
    for (k, v) in locals {
        if let Value::Int(v) = v {
            if *v >= 0 {
                let v = *v as usize;
                if v < rows {
                    pointers.insert(format!("{}_row", k), (v, 0));
                }
                if v < cols {
                    pointers.insert(format!("{}_col", k), (0, v));
                }
            }
        }
    }

    let mut paths: Vec<Vec<(usize, usize)>> = Vec::new();
    for v in locals.values() {
        if let Value::List(candidate) = v {
            let candidate = candidate.try_borrow().map_err(|_| ClassifyError::Borrowed)?;
            if candidate.is_empty() {
                continue;
            }
            let mut path = Vec::with_capacity(candidate.len());
            for entry in candidate.iter() {
                match as_cell_pair(entry)? {
                    Some((r, c)) if r < rows && c < cols => path.push((r, c)),
                    _ => {
                        path.clear();
                        break;
                    }
                }
            }
            if !path.is_empty() {
                paths.push(path);
            }
        }
    }

    let mut visual = Visual::new(VisualKind::Grid, name);
    visual.rows = Some(rows);
    visual.cols = Some(cols);
    visual.cells = Some(
        rows_data
            .iter()
            .map(|row| row.iter().map(serialize_value).collect())
            .collect(),
    );
    visual.cell_states = Some(cell_states);
    visual.pointers = Some(Pointers::Cell(pointers));
    visual.paths = Some(paths);
    Ok(Some(visual))
}

/// Square list of equal-length strings, N-Queens style
fn string_board_grid(name: &str, items: &[Value]) -> Result<Option<Visual>, ClassifyError> {
    let mut board: Vec<Vec<String>> = Vec::with_capacity(items.len());
    for row in items {
        match row {
            Value::Str(s) => board.push(s.chars().map(|c| c.to_string()).collect()),
            _ => return Ok(None),
        }
    }
    let rows = board.len();
    if board.iter().any(|row| row.len() != rows) {
        return Ok(None);
    }
    let cols = rows;

    let mut cell_states = Vec::new();
    for (r, row) in board.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if PIECE_CHARS.contains(&cell.as_str()) {
                cell_states.push(CellState {
                    row: r,
                    col: c,
                    state: "piece".to_string(),
                    piece: Some(cell.clone()),
                });
            } else if cell == "X" {
                cell_states.push(CellState {
                    row: r,
                    col: c,
                    state: "blocked".to_string(),
                    piece: None,
                });
            } else if cell == "1" {
                cell_states.push(CellState {
                    row: r,
                    col: c,
                    state: "visited".to_string(),
                    piece: None,
                });
            }
        }
    }

    let mut visual = Visual::new(VisualKind::Grid, name);
    visual.rows = Some(rows);
    visual.cols = Some(cols);
    visual.cells = Some(
        board
            .into_iter()
            .map(|row| row.into_iter().map(serde_json::Value::String).collect())
            .collect(),
    );
    visual.cell_states = Some(cell_states);
    Ok(Some(visual))
}

/// A two-element list of non-negative ints, read as a (row, col) pair
fn as_cell_pair(value: &Value) -> Result<Option<(usize, usize)>, ClassifyError> {
    let items = match value {
        Value::List(items) => items.try_borrow().map_err(|_| ClassifyError::Borrowed)?,
        _ => return Ok(None),
    };
    match items.as_slice() {
        [Value::Int(r), Value::Int(c)] if *r >= 0 && *c >= 0 => {
            Ok(Some((*r as usize, *c as usize)))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locals(entries: Vec<(&str, Value)>) -> IndexMap<String, Value> {
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn ints(values: &[i64]) -> Value {
        Value::new_list(values.iter().copied().map(Value::Int).collect())
    }

    fn node(val: i64, next: Value) -> Value {
        let mut fields = IndexMap::new();
        fields.insert("val".to_string(), Value::Int(val));
        fields.insert("next".to_string(), next);
        Value::new_object(fields)
    }

    fn tree_node(val: i64, left: Value, right: Value) -> Value {
        let mut fields = IndexMap::new();
        fields.insert("val".to_string(), Value::Int(val));
        fields.insert("left".to_string(), left);
        fields.insert("right".to_string(), right);
        Value::new_object(fields)
    }

    #[test]
    fn test_plain_list_is_array_with_pointers() {
        let vars = locals(vec![("arr", ints(&[5, 6, 7])), ("i", Value::Int(1))]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals[0].kind, VisualKind::Array);
        assert_eq!(visuals[0].name, "arr");
        match &visuals[0].pointers {
            Some(Pointers::Index(map)) => {
                assert_eq!(map.get(&1), Some(&vec!["i".to_string()]));
                assert_eq!(map.get(&0), Some(&vec!["i (1-based)".to_string()]));
            }
            other => panic!("expected index pointers, got {:?}", other),
        }
    }

    #[test]
    fn test_stack_name_wins_over_alias() {
        let list = ints(&[1, 2]);
        let vars = locals(vec![("tmp", list.clone()), ("my_stack", list)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals[0].kind, VisualKind::Stack);
        assert_eq!(visuals[0].name, "my_stack");
    }

    #[test]
    fn test_mutator_function_makes_stack() {
        let vars = locals(vec![("items", ints(&[1]))]);
        let visuals = detect_visuals(&vars, Some("push"), FocusPolicy::default()).unwrap();
        assert_eq!(visuals[0].kind, VisualKind::Stack);
    }

    #[test]
    fn test_nested_list_found_under_dotted_path() {
        let mut fields = IndexMap::new();
        fields.insert("data".to_string(), ints(&[9]));
        let vars = locals(vec![("obj", Value::new_object(fields))]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        assert_eq!(visuals[0].name, "obj.data");
    }

    #[test]
    fn test_queue_suppresses_arrays() {
        let vars = locals(vec![("queue", ints(&[1, 2])), ("arr", ints(&[3]))]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals[0].kind, VisualKind::Queue);
    }

    #[test]
    fn test_queue_preference_can_be_disabled() {
        let vars = locals(vec![("queue", ints(&[1, 2])), ("arr", ints(&[3]))]);
        let policy = FocusPolicy {
            queue_first: false,
            ..FocusPolicy::default()
        };
        let visuals = detect_visuals(&vars, None, policy).unwrap();
        assert_eq!(visuals.len(), 2);
    }

    #[test]
    fn test_linked_list_walk_with_aliases() {
        let tail = node(2, Value::Null);
        let head = node(1, tail.clone());
        let vars = locals(vec![("head", head), ("current", tail)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let list = visuals
            .iter()
            .find(|v| v.kind == VisualKind::LinkedList && v.name == "head")
            .expect("no linked list visual for head");
        let nodes = list.nodes.as_ref().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].next, Some(1));
        assert_eq!(nodes[1].next, None);
        match &list.pointers {
            Some(Pointers::Index(map)) => {
                assert_eq!(map.get(&0), Some(&vec!["head".to_string()]));
                assert_eq!(map.get(&1), Some(&vec!["current".to_string()]));
            }
            other => panic!("expected index pointers, got {:?}", other),
        }
    }

    #[test]
    fn test_cyclic_linked_list_terminates() {
        let a = node(1, Value::Null);
        let b = node(2, a.clone());
        if let Value::Object(fields) = &a {
            fields.borrow_mut().insert("next".to_string(), b.clone());
        }
        let vars = locals(vec![("head", a)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let list = visuals
            .iter()
            .find(|v| v.kind == VisualKind::LinkedList)
            .expect("no linked list visual");
        assert_eq!(list.nodes.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_binary_tree_preorder_ids() {
        let root = tree_node(
            1,
            tree_node(2, Value::Null, Value::Null),
            tree_node(3, Value::Null, Value::Null),
        );
        let vars = locals(vec![("root", root)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let tree = visuals
            .iter()
            .find(|v| v.kind == VisualKind::BinaryTree)
            .expect("no binary tree visual");
        match tree.root.as_ref().unwrap() {
            TreeRoot::Binary(root) => {
                assert_eq!(root.id, 0);
                assert_eq!(root.left.as_ref().unwrap().id, 1);
                assert_eq!(root.right.as_ref().unwrap().id, 2);
            }
            other => panic!("expected binary root, got {:?}", other),
        }
    }

    #[test]
    fn test_heap_pointer_remap_and_exclusivity() {
        // preorder walk of [10, 20, 30]: index 0 -> id 0, 1 -> 1, 2 -> 2
        // but for [10, 20, 30, 40]: index 2 (right child) gets id 3
        let vars = locals(vec![("heap", ints(&[10, 20, 30, 40])), ("i", Value::Int(2))]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        // heap tree suppresses the flat array view
        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals[0].kind, VisualKind::BinaryTree);
        assert_eq!(visuals[0].name, "heap (as tree)");
        match &visuals[0].pointers {
            Some(Pointers::Index(map)) => {
                assert_eq!(map.get(&3), Some(&vec!["i".to_string()]));
            }
            other => panic!("expected index pointers, got {:?}", other),
        }
    }

    fn count_nodes(node: &BinaryNodeRecord) -> usize {
        1 + node.left.as_deref().map_or(0, count_nodes)
            + node.right.as_deref().map_or(0, count_nodes)
    }

    #[test]
    fn test_heap_depth_cap_limits_node_count() {
        let values: Vec<i64> = (0..40).collect();
        let vars = locals(vec![("heap", ints(&values))]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        assert_eq!(visuals.len(), 1);
        assert_eq!(visuals[0].name, "heap (as tree)");
        match visuals[0].root.as_ref().unwrap() {
            // five full levels: 2^5 - 1 nodes of the 40 elements
            TreeRoot::Binary(root) => assert_eq!(count_nodes(root), 31),
            other => panic!("expected binary root, got {:?}", other),
        }
    }

    #[test]
    fn test_general_tree_from_children_map() {
        let mut leaf_fields = IndexMap::new();
        leaf_fields.insert("children".to_string(), Value::new_object(IndexMap::new()));
        let leaf = Value::new_object(leaf_fields);
        let mut children = IndexMap::new();
        children.insert("a".to_string(), leaf);
        let mut root_fields = IndexMap::new();
        root_fields.insert("children".to_string(), Value::new_object(children));
        let vars = locals(vec![("trie", Value::new_object(root_fields))]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let tree = visuals
            .iter()
            .find(|v| v.kind == VisualKind::GeneralTree)
            .expect("no general tree visual");
        match tree.root.as_ref().unwrap() {
            TreeRoot::General(root) => {
                assert_eq!(root.id, 0);
                assert_eq!(root.children.len(), 1);
                assert_eq!(root.children[0].label, "a");
                assert_eq!(root.children[0].node.id, 1);
            }
            other => panic!("expected general root, got {:?}", other),
        }
    }

    #[test]
    fn test_grid_states_and_pointers() {
        let grid = Value::new_list(vec![
            Value::new_list(vec![
                Value::Str("Q".to_string()),
                Value::Int(1),
                Value::Str("X".to_string()),
            ]),
            Value::new_list(vec![
                Value::Str(".".to_string()),
                Value::Int(0),
                Value::Int(0),
            ]),
        ]);
        let pos = Value::new_list(vec![Value::Int(1), Value::Int(2)]);
        let vars = locals(vec![("board", grid), ("pos", pos)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let grid = visuals
            .iter()
            .find(|v| v.kind == VisualKind::Grid)
            .expect("no grid visual");
        assert_eq!(grid.rows, Some(2));
        assert_eq!(grid.cols, Some(3));
        let states = grid.cell_states.as_ref().unwrap();
        let kinds: Vec<&str> = states.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(kinds, vec!["piece", "visited", "blocked"]);
        match grid.pointers.as_ref().unwrap() {
            Pointers::Cell(map) => assert_eq!(map.get("pos"), Some(&(1, 2))),
            other => panic!("expected cell pointers, got {:?}", other),
        }
    }

    #[test]
    fn test_grid_paths_from_pair_lists() {
        let grid = Value::new_list(vec![ints(&[0, 0, 0]), ints(&[0, 0, 0]), ints(&[0, 0, 0])]);
        let path = Value::new_list(vec![
            Value::new_list(vec![Value::Int(0), Value::Int(0)]),
            Value::new_list(vec![Value::Int(1), Value::Int(1)]),
            Value::new_list(vec![Value::Int(2), Value::Int(2)]),
        ]);
        let stray = Value::new_list(vec![Value::new_list(vec![
            Value::Int(5),
            Value::Int(5),
        ])]);
        let vars = locals(vec![("maze", grid), ("path", path), ("stray", stray)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let maze = visuals
            .iter()
            .find(|v| v.kind == VisualKind::Grid && v.name == "maze")
            .expect("no grid visual for maze");
        // the in-bounds pair list becomes a path; the out-of-bounds one is
        // dropped, and the grid's own rows are not pairs
        let paths = maze.paths.as_ref().unwrap();
        assert_eq!(paths, &vec![vec![(0, 0), (1, 1), (2, 2)]]);
    }

    #[test]
    fn test_string_board_grid() {
        let board = Value::new_list(vec![
            Value::Str(".Q".to_string()),
            Value::Str("Q.".to_string()),
        ]);
        let vars = locals(vec![("solution", board)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        let grid = visuals
            .iter()
            .find(|v| v.kind == VisualKind::Grid)
            .expect("no grid visual");
        let states = grid.cell_states.as_ref().unwrap();
        assert_eq!(states.len(), 2);
        assert!(states.iter().all(|s| s.state == "piece"));
        // string boards carry no pointer or path annotations
        assert!(grid.pointers.is_none());
    }

    #[test]
    fn test_ragged_nested_list_is_not_a_grid() {
        let ragged = Value::new_list(vec![ints(&[1, 2]), ints(&[3])]);
        let vars = locals(vec![("m", ragged)]);
        let visuals = detect_visuals(&vars, None, FocusPolicy::default()).unwrap();
        assert!(visuals.iter().all(|v| v.kind != VisualKind::Grid));
    }
}
