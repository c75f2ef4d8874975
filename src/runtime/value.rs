//! Runtime values
//!
//! Lists and objects are reference types: assigning one to another variable
//! aliases the same underlying storage, which is what lets the structure
//! detectors deduplicate the same list found under several names.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::parser::ast::Stmt;

/// A user-defined function captured at definition time
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    /// Line of the `function` keyword, in raw (pre-translation) coordinates
    pub line: usize,
    /// False for injected helper functions, which are hidden from traces
    pub traced: bool,
}

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<Function>),
}

impl Value {
    pub fn new_list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn new_object(fields: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(fields)))
    }

    /// Stable identity for reference types, used for aliasing detection
    /// and cycle guards. Scalars have no identity.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::List(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Object(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            Value::Function(rc) => Some(Rc::as_ptr(rc) as *const u8 as usize),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Truthiness: null, false, 0, 0.0, and "" are falsy; everything else
    /// (including empty containers) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Equality for `==` / `!=`. Numbers compare across int/float;
    /// containers and functions compare by identity.
    pub fn loosely_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

const DISPLAY_DEPTH_LIMIT: usize = 6;

fn fmt_value(value: &Value, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    if depth > DISPLAY_DEPTH_LIMIT {
        return write!(f, "...");
    }
    match value {
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(n) => write!(f, "{}", n),
        Value::Float(x) => {
            if x.fract() == 0.0 && x.is_finite() {
                write!(f, "{:.1}", x)
            } else {
                write!(f, "{}", x)
            }
        }
        Value::Str(s) => {
            if depth == 0 {
                write!(f, "{}", s)
            } else {
                write!(f, "{:?}", s)
            }
        }
        Value::List(items) => match items.try_borrow() {
            Ok(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_value(item, f, depth + 1)?;
                }
                write!(f, "]")
            }
            Err(_) => write!(f, "[...]"),
        },
        Value::Object(fields) => match fields.try_borrow() {
            Ok(fields) => {
                write!(f, "{{")?;
                for (i, (key, val)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    fmt_value(val, f, depth + 1)?;
                }
                write!(f, "}}")
            }
            Err(_) => write!(f, "{{...}}"),
        },
        Value::Function(func) => write!(f, "<function {}>", func.name),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_value(self, f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::new_list(vec![]).is_truthy());
    }

    #[test]
    fn test_container_equality_is_identity() {
        let a = Value::new_list(vec![Value::Int(1)]);
        let b = Value::new_list(vec![Value::Int(1)]);
        let c = a.clone();
        assert!(!a.loosely_equal(&b));
        assert!(a.loosely_equal(&c));
    }

    #[test]
    fn test_numeric_cross_equality() {
        assert!(Value::Int(2).loosely_equal(&Value::Float(2.0)));
        assert!(!Value::Int(2).loosely_equal(&Value::Float(2.5)));
    }

    #[test]
    fn test_display() {
        let list = Value::new_list(vec![
            Value::Int(1),
            Value::Str("a".to_string()),
            Value::Null,
        ]);
        assert_eq!(list.to_string(), "[1, \"a\", null]");
        assert_eq!(Value::Str("hi".to_string()).to_string(), "hi");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
    }

    #[test]
    fn test_display_cyclic_list_is_bounded() {
        let inner = Value::new_list(vec![Value::Int(1)]);
        if let Value::List(rc) = &inner {
            rc.borrow_mut().push(inner.clone());
        }
        // Depth limit cuts the recursion off
        let rendered = inner.to_string();
        assert!(rendered.contains("..."));
    }
}
