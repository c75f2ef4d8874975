//! Language-level behavior, checked through captured output

use stepscope::interpreter::{self, NullSink, RuntimeError};
use stepscope::parser::Parser;
use stepscope::trace::OutputBuffer;

fn run_for_output(source: &str) -> String {
    let mut parser = Parser::new(source).expect("lexing failed");
    let program = parser.parse_program().expect("parsing failed");
    let output = OutputBuffer::new();
    interpreter::run(&program, 0, output.clone(), &mut NullSink).expect("execution failed");
    output.tail(100_000)
}

fn run_for_error(source: &str) -> RuntimeError {
    let mut parser = Parser::new(source).expect("lexing failed");
    let program = parser.parse_program().expect("parsing failed");
    interpreter::run(&program, 0, OutputBuffer::new(), &mut NullSink)
        .expect_err("execution unexpectedly succeeded")
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(run_for_output("print(2 + 3 * 4);"), "14\n");
    assert_eq!(run_for_output("print((2 + 3) * 4);"), "20\n");
    assert_eq!(run_for_output("print(7 / 2);"), "3\n");
    assert_eq!(run_for_output("print(-7 / 2);"), "-3\n");
    assert_eq!(run_for_output("print(7 % 3);"), "1\n");
    assert_eq!(run_for_output("print(7.0 / 2);"), "3.5\n");
    assert_eq!(run_for_output("print(1 - 2 - 3);"), "-4\n");
}

#[test]
fn comparison_and_logic() {
    assert_eq!(run_for_output("print(1 < 2, 2 <= 2, 3 > 4);"), "true true false\n");
    assert_eq!(run_for_output("print(1 == 1.0);"), "true\n");
    assert_eq!(run_for_output("print(true && false, true || false);"), "false true\n");
    assert_eq!(run_for_output("print(!0, !1);"), "true false\n");
    // short-circuit: the divide never runs
    assert_eq!(run_for_output("print(false && 1 / 0 == 0);"), "false\n");
}

#[test]
fn if_else_chain() {
    let source = "\
x = 15;
if (x < 10) {
    print(\"small\");
} else if (x < 20) {
    print(\"medium\");
} else {
    print(\"large\");
}";
    assert_eq!(run_for_output(source), "medium\n");
}

#[test]
fn while_with_break_and_continue() {
    let source = "\
i = 0;
while (true) {
    i += 1;
    if (i == 3) {
        continue;
    }
    if (i > 5) {
        break;
    }
    print(i);
}";
    assert_eq!(run_for_output(source), "1\n2\n4\n5\n");
}

#[test]
fn c_style_for_loop() {
    let source = "\
total = 0;
for (i = 0; i < 5; i += 1) {
    total += i;
}
print(total);";
    assert_eq!(run_for_output(source), "10\n");
}

#[test]
fn for_in_over_list_and_string() {
    assert_eq!(
        run_for_output("for (v in [10, 20]) {\n    print(v);\n}"),
        "10\n20\n"
    );
    assert_eq!(
        run_for_output("for (c in \"ab\") {\n    print(c);\n}"),
        "a\nb\n"
    );
}

#[test]
fn recursive_function() {
    let source = "\
function fib(n) {
    if (n < 2) {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}
print(fib(10));";
    assert_eq!(run_for_output(source), "55\n");
}

#[test]
fn function_scope_shadows_globals() {
    let source = "\
x = 1;
function f() {
    x = 2;
    return x;
}
y = f();
print(x, y);";
    assert_eq!(run_for_output(source), "1 2\n");
}

#[test]
fn list_methods_and_indexing() {
    let source = "\
a = [1, 2];
a.push(3);
print(a.pop());
print(a.shift());
print(a, len(a));
a[0] = 9;
print(a[-1]);";
    assert_eq!(run_for_output(source), "3\n1\n[2] 1\n9\n");
}

#[test]
fn objects_and_nested_access() {
    let source = "\
node = { val: 1, next: { val: 2, next: null } };
print(node.next.val);
node.next.val = 7;
print(node.next.val);
print(node[\"val\"]);";
    assert_eq!(run_for_output(source), "2\n7\n1\n");
}

#[test]
fn bubble_sort_end_to_end() {
    let source = "\
arr = [5, 2, 4, 1];
n = len(arr);
for (i = 0; i < n - 1; i += 1) {
    for (j = 0; j < n - i - 1; j += 1) {
        if (arr[j] > arr[j + 1]) {
            tmp = arr[j];
            arr[j] = arr[j + 1];
            arr[j + 1] = tmp;
        }
    }
}
print(arr);";
    assert_eq!(run_for_output(source), "[1, 2, 4, 5]\n");
}

#[test]
fn builtins() {
    assert_eq!(run_for_output("print(range(3));"), "[0, 1, 2]\n");
    assert_eq!(run_for_output("print(range(2, 5));"), "[2, 3, 4]\n");
    assert_eq!(run_for_output("print(abs(-3), abs(2.5));"), "3 2.5\n");
    assert_eq!(run_for_output("print(str(12) + \"!\");"), "12!\n");
    assert_eq!(run_for_output("print(len(\"abc\"), len([1]), len({ a: 1 }));"), "3 1 1\n");
}

#[test]
fn user_function_shadows_builtin() {
    let source = "\
function len(x) {
    return 99;
}
print(len([1, 2]));";
    assert_eq!(run_for_output(source), "99\n");
}

#[test]
fn index_out_of_bounds() {
    let err = run_for_error("a = [1];\nx = a[3];");
    assert!(matches!(
        err,
        RuntimeError::IndexOutOfBounds { index: 3, len: 1, line: 2 }
    ));
}

#[test]
fn pop_from_empty_list() {
    let err = run_for_error("a = [];\nx = a.pop();");
    assert!(matches!(err, RuntimeError::EmptyPop { .. }));
}

#[test]
fn null_field_access() {
    let err = run_for_error("x = null;\ny = x.val;");
    assert!(matches!(err, RuntimeError::NullFieldAccess { .. }));
}

#[test]
fn wrong_argument_count() {
    let err = run_for_error("function f(a, b) {\n    return a;\n}\nf(1);");
    match err {
        RuntimeError::ArgumentCountMismatch { name, expected, got, .. } => {
            assert_eq!(name, "f");
            assert_eq!(expected, 2);
            assert_eq!(got, 1);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn integer_overflow_is_an_error() {
    let err = run_for_error("x = 9223372036854775807;\ny = x + 1;");
    assert!(matches!(err, RuntimeError::IntegerOverflow { line: 2 }));
}
