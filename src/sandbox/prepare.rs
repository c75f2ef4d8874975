//! Snippet preparation
//!
//! Before execution the user's snippet gets a prelude of helper
//! constructors (`ListNode`, `TreeNode`, ...) and, when the snippet brings
//! no inputs of its own, a set of sample inputs to run against. The prelude
//! line count is carried alongside the combined source so the interpreter
//! can keep every reported line number in the user's own coordinates.

/// Names bound by the prelude, hidden from recorded variables
pub const HELPER_NAMES: &[&str] = &[
    "ListNode",
    "TreeNode",
    "Node",
    "create_linked_list",
    "list_to_array",
    "traverse",
    "print_list",
    "print_tree",
];

const HELPER_SOURCE: &str = "\
function ListNode(val, next) {
    return { val: val, next: next };
}
function TreeNode(val, left, right) {
    return { val: val, left: left, right: right };
}
function Node(val, next) {
    return { val: val, next: next };
}
function traverse(head) {
    current = head;
    rendered = \"\";
    while (current) {
        if (current.next) {
            rendered = rendered + str(current.val) + \" -> \";
        } else {
            rendered = rendered + str(current.val);
        }
        current = current.next;
    }
    print(rendered);
}
function print_list(head) {
    traverse(head);
}
function create_linked_list(values) {
    if (len(values) == 0) {
        return null;
    }
    head = ListNode(values[0], null);
    current = head;
    for (i = 1; i < len(values); i += 1) {
        current.next = ListNode(values[i], null);
        current = current.next;
    }
    return head;
}
function list_to_array(head) {
    result = [];
    current = head;
    while (current) {
        result.push(current.val);
        current = current.next;
    }
    return result;
}
function print_tree(root, level) {
    if (root == null) {
        return;
    }
    print_tree(root.right, level + 1);
    indent = \"\";
    for (i = 0; i < level; i += 1) {
        indent = indent + \"  \";
    }
    print(indent + str(root.val));
    print_tree(root.left, level + 1);
}
";

const SAMPLE_SOURCE: &str = "\
head = ListNode(1, ListNode(2, ListNode(3, ListNode(4, ListNode(5, null)))));
root = TreeNode(1, TreeNode(2, TreeNode(4, null, null), TreeNode(5, null, null)), TreeNode(3, null, null));
arr = [64, 34, 25, 12, 22, 11, 90];
nums = [3, 2, 4, 1, 5];
target = 6;
";

/// Substrings whose presence means the snippet supplies its own inputs
const SAMPLE_INPUT_TOKENS: &[&str] = &[
    "print(", "head =", "root =", "arr =", "nums =", "target =", "test", "example", "main",
];

/// A snippet combined with its prelude
#[derive(Debug, Clone)]
pub struct Prepared {
    pub source: String,
    /// Number of prelude lines ahead of the user's first line
    pub prelude_lines: usize,
}

fn has_sample_inputs(user_code: &str) -> bool {
    let lowered = user_code.to_lowercase();
    SAMPLE_INPUT_TOKENS
        .iter()
        .any(|token| lowered.contains(token))
}

/// Attach the helper prelude (and sample inputs if needed) to a snippet
pub fn prepare(user_code: &str) -> Prepared {
    let mut prelude = String::from(HELPER_SOURCE);
    if !has_sample_inputs(user_code) {
        prelude.push_str(SAMPLE_SOURCE);
    }
    let prelude_lines = prelude.lines().count();
    let source = format!("{}{}", prelude, user_code);
    Prepared {
        source,
        prelude_lines,
    }
}
