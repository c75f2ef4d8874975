//! Built-in functions
//!
//! Builtins resolve only after variable lookup fails, so a user function
//! named `len` shadows the builtin.

use crate::interpreter::errors::RuntimeError;
use crate::runtime::Value;
use crate::trace::OutputBuffer;

pub const BUILTIN_NAMES: &[&str] = &["print", "len", "range", "str", "abs"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

pub fn call_builtin(
    name: &str,
    args: &[Value],
    line: usize,
    output: &OutputBuffer,
) -> Result<Value, RuntimeError> {
    match name {
        "print" => {
            let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
            output.push_str(&rendered.join(" "));
            output.push_str("\n");
            Ok(Value::Null)
        }
        "len" => {
            expect_arg_count(name, args, 1, line)?;
            match &args[0] {
                Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                Value::Object(fields) => Ok(Value::Int(fields.borrow().len() as i64)),
                other => Err(RuntimeError::TypeError {
                    expected: "list, string, or object".to_string(),
                    got: other.type_name().to_string(),
                    line,
                }),
            }
        }
        "range" => {
            let (start, end) = match args {
                [end] => (0, expect_int(name, end, line)?),
                [start, end] => (expect_int(name, start, line)?, expect_int(name, end, line)?),
                _ => {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        name: name.to_string(),
                        expected: 2,
                        got: args.len(),
                        line,
                    })
                }
            };
            let items: Vec<Value> = (start..end).map(Value::Int).collect();
            Ok(Value::new_list(items))
        }
        "str" => {
            expect_arg_count(name, args, 1, line)?;
            Ok(Value::Str(args[0].to_string()))
        }
        "abs" => {
            expect_arg_count(name, args, 1, line)?;
            match &args[0] {
                Value::Int(n) => n
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { line }),
                Value::Float(x) => Ok(Value::Float(x.abs())),
                other => Err(RuntimeError::TypeError {
                    expected: "number".to_string(),
                    got: other.type_name().to_string(),
                    line,
                }),
            }
        }
        _ => Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            line,
        }),
    }
}

fn expect_arg_count(
    name: &str,
    args: &[Value],
    expected: usize,
    line: usize,
) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::ArgumentCountMismatch {
            name: name.to_string(),
            expected,
            got: args.len(),
            line,
        });
    }
    Ok(())
}

fn expect_int(name: &str, value: &Value, line: usize) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(RuntimeError::TypeError {
            expected: format!("int argument to {}", name),
            got: other.type_name().to_string(),
            line,
        }),
    }
}
