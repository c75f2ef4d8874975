//! Tree-walking interpreter
//!
//! Executes a parsed program and fires a trace event at every statement
//! boundary, function entry, and function return. The sink decides what to
//! record; the engine only decides *when* something is observable.
//!
//! Events are suppressed for statements in the injected prelude region
//! (raw line <= `prelude_lines`) and inside untraced helper frames, so the
//! trace only ever shows the user's own code.

use std::cell::RefCell;
use std::rc::Rc;

use crate::interpreter::builtins::{call_builtin, is_builtin};
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{BinOp, Expr, Program, SourceLocation, Stmt, UnOp};
use crate::runtime::{CallStack, Frame, Function, Value};
use crate::trace::OutputBuffer;

/// Maximum call stack depth before execution aborts
pub const RECURSION_LIMIT: usize = 100;

/// What happened at an observable point of execution
pub enum EventKind<'v> {
    /// A traced function frame was just entered, parameters bound
    Call,
    /// A statement is about to execute
    Line,
    /// The current traced frame is about to return
    Return { value: &'v Value },
}

/// A single trace event, borrowed from interpreter state
pub struct TraceEvent<'a, 'v> {
    pub kind: EventKind<'v>,
    /// User-relative line number
    pub line: usize,
    pub stack: &'a CallStack,
}

/// Receiver for trace events
pub trait EventSink {
    fn on_event(&mut self, event: TraceEvent<'_, '_>);
}

/// Sink that discards all events, for running code without tracing
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: TraceEvent<'_, '_>) {}
}

/// Non-error control flow out of a statement
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Run a program to completion, feeding trace events to `sink`.
///
/// `prelude_lines` is the number of source lines occupied by injected
/// helper code ahead of the user's snippet; lines at or below it are
/// invisible to the sink and line numbers reported past it are shifted
/// back into the user's coordinates.
pub fn run<S: EventSink>(
    program: &Program,
    prelude_lines: usize,
    output: OutputBuffer,
    sink: &mut S,
) -> Result<(), RuntimeError> {
    let mut interp = Interpreter {
        stack: CallStack::new(),
        output,
        sink,
        prelude_lines,
    };
    for stmt in &program.stmts {
        if let Flow::Return(_) = interp.exec_stmt(stmt)? {
            break;
        }
    }
    // the module frame returns too, so the trace ends with a snapshot of
    // the final state; skipped when nothing in the user region ran
    if interp.stack.current().line > 0 {
        let result = Value::Null;
        interp.sink.on_event(TraceEvent {
            kind: EventKind::Return { value: &result },
            line: interp.stack.current().line,
            stack: &interp.stack,
        });
    }
    Ok(())
}

struct Interpreter<'s, S: EventSink> {
    stack: CallStack,
    output: OutputBuffer,
    sink: &'s mut S,
    prelude_lines: usize,
}

impl<S: EventSink> Interpreter<'_, S> {
    // ========== Statements ==========

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        self.statement_event(stmt.location());
        self.exec_stmt_inner(stmt)
    }

    /// Fire a line event for a statement about to execute, if it is in the
    /// user's region of the source and the current frame is traced.
    fn statement_event(&mut self, location: SourceLocation) {
        if location.line <= self.prelude_lines || !self.stack.current().traced {
            return;
        }
        let line = location.line - self.prelude_lines;
        self.stack.current_mut().line = line;
        self.sink.on_event(TraceEvent {
            kind: EventKind::Line,
            line,
            stack: &self.stack,
        });
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::FunctionDef {
                name,
                params,
                body,
                location,
            } => {
                let traced = location.line > self.prelude_lines;
                let func = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    line: location.line,
                    traced,
                };
                self.stack.assign(name, Value::Function(Rc::new(func)));
                Ok(Flow::Normal)
            }
            Stmt::Assignment { target, value, .. } => {
                let value = self.eval_expr(value)?;
                self.assign_target(target, value)?;
                Ok(Flow::Normal)
            }
            Stmt::CompoundAssignment {
                target,
                op,
                value,
                location,
            } => {
                let current = self.eval_expr(target)?;
                let rhs = self.eval_expr(value)?;
                let line = self.user_line(*location);
                let result = self.eval_binop(*op, current, rhs, line)?;
                self.assign_target(target, result)?;
                Ok(Flow::Normal)
            }
            Stmt::ExpressionStatement { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.exec_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While {
                condition,
                body,
                location,
            } => {
                let mut first = true;
                loop {
                    // the loop header shows up as a step on every re-check
                    if !first {
                        self.statement_event(*location);
                    }
                    first = false;
                    if !self.eval_expr(condition)?.is_truthy() {
                        break;
                    }
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For {
                init,
                condition,
                step,
                body,
                location,
            } => {
                if let Some(init) = init {
                    self.exec_stmt_inner(init)?;
                }
                let mut first = true;
                loop {
                    if !first {
                        self.statement_event(*location);
                    }
                    first = false;
                    if let Some(condition) = condition {
                        if !self.eval_expr(condition)?.is_truthy() {
                            break;
                        }
                    }
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                    if let Some(step) = step {
                        self.exec_stmt_inner(step)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::ForIn {
                var,
                iterable,
                body,
                location,
            } => {
                let iterable = self.eval_expr(iterable)?;
                let items: Vec<Value> = match &iterable {
                    // iterate over a snapshot; mutating the list mid-loop
                    // does not change the iteration
                    Value::List(items) => items.borrow().to_vec(),
                    Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
                    other => {
                        return Err(RuntimeError::TypeError {
                            expected: "list or string".to_string(),
                            got: other.type_name().to_string(),
                            line: self.user_line(*location),
                        })
                    }
                };
                let mut first = true;
                for item in items {
                    if !first {
                        self.statement_event(*location);
                    }
                    first = false;
                    self.stack.assign(var, item);
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    // ========== Expressions ==========

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::IntLiteral(n, _) => Ok(Value::Int(*n)),
            Expr::FloatLiteral(x, _) => Ok(Value::Float(*x)),
            Expr::StringLiteral(s, _) => Ok(Value::Str(s.clone())),
            Expr::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
            Expr::Null(_) => Ok(Value::Null),
            Expr::Variable(name, location) => {
                self.stack
                    .lookup(name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        line: self.user_line(*location),
                    })
            }
            Expr::ListLiteral(elements, _) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval_expr(element)?);
                }
                Ok(Value::new_list(items))
            }
            Expr::ObjectLiteral { fields, .. } => {
                let mut map = indexmap::IndexMap::new();
                for (key, value) in fields {
                    let value = self.eval_expr(value)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::new_object(map))
            }
            Expr::BinaryOp {
                op: BinOp::And,
                left,
                right,
                ..
            } => {
                let left = self.eval_expr(left)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_expr(right)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            Expr::BinaryOp {
                op: BinOp::Or,
                left,
                right,
                ..
            } => {
                let left = self.eval_expr(left)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval_expr(right)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            Expr::BinaryOp {
                op,
                left,
                right,
                location,
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                let line = self.user_line(*location);
                self.eval_binop(*op, left, right, line)
            }
            Expr::UnaryOp {
                op,
                operand,
                location,
            } => {
                let operand = self.eval_expr(operand)?;
                let line = self.user_line(*location);
                match op {
                    UnOp::Neg => match operand {
                        Value::Int(n) => n
                            .checked_neg()
                            .map(Value::Int)
                            .ok_or(RuntimeError::IntegerOverflow { line }),
                        Value::Float(x) => Ok(Value::Float(-x)),
                        other => Err(RuntimeError::TypeError {
                            expected: "number".to_string(),
                            got: other.type_name().to_string(),
                            line,
                        }),
                    },
                    UnOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                }
            }
            Expr::Call {
                callee,
                args,
                location,
            } => self.eval_call(callee, args, *location),
            Expr::Index {
                object,
                index,
                location,
            } => {
                let obj = self.eval_expr(object)?;
                let idx = self.eval_expr(index)?;
                let line = self.user_line(*location);
                match (obj, idx) {
                    (Value::List(items), Value::Int(i)) => {
                        let items = items.borrow();
                        let resolved = resolve_index(i, items.len()).ok_or(
                            RuntimeError::IndexOutOfBounds {
                                index: i,
                                len: items.len(),
                                line,
                            },
                        )?;
                        Ok(items[resolved].clone())
                    }
                    (Value::Str(s), Value::Int(i)) => {
                        let chars: Vec<char> = s.chars().collect();
                        let resolved =
                            resolve_index(i, chars.len()).ok_or(RuntimeError::IndexOutOfBounds {
                                index: i,
                                len: chars.len(),
                                line,
                            })?;
                        Ok(Value::Str(chars[resolved].to_string()))
                    }
                    (Value::Object(fields), Value::Str(key)) => fields
                        .borrow()
                        .get(&key)
                        .cloned()
                        .ok_or(RuntimeError::UnknownField { field: key, line }),
                    (obj, idx) => Err(RuntimeError::TypeError {
                        expected: "list[int], string[int], or object[string]".to_string(),
                        got: format!("{}[{}]", obj.type_name(), idx.type_name()),
                        line,
                    }),
                }
            }
            Expr::Member {
                object,
                field,
                location,
            } => {
                let obj = self.eval_expr(object)?;
                let line = self.user_line(*location);
                match obj {
                    Value::Object(fields) => fields.borrow().get(field).cloned().ok_or_else(|| {
                        RuntimeError::UnknownField {
                            field: field.clone(),
                            line,
                        }
                    }),
                    Value::Null => Err(RuntimeError::NullFieldAccess {
                        field: field.clone(),
                        line,
                    }),
                    other => Err(RuntimeError::TypeError {
                        expected: "object".to_string(),
                        got: other.type_name().to_string(),
                        line,
                    }),
                }
            }
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?);
        }

        match callee {
            Expr::Variable(name, _) => {
                if let Some(value) = self.stack.lookup(name) {
                    self.call_value(value, arg_values, location)
                } else if is_builtin(name) {
                    call_builtin(name, &arg_values, self.user_line(location), &self.output)
                } else {
                    Err(RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        line: self.user_line(location),
                    })
                }
            }
            Expr::Member { object, field, .. } => {
                let obj = self.eval_expr(object)?;
                let line = self.user_line(location);
                match obj {
                    Value::List(items) => {
                        self.call_list_method(&items, field, arg_values, line)
                    }
                    Value::Object(fields) => {
                        let value = fields.borrow().get(field).cloned().ok_or_else(|| {
                            RuntimeError::UnknownField {
                                field: field.clone(),
                                line,
                            }
                        })?;
                        self.call_value(value, arg_values, location)
                    }
                    Value::Null => Err(RuntimeError::NullFieldAccess {
                        field: field.clone(),
                        line,
                    }),
                    other => Err(RuntimeError::TypeError {
                        expected: "list or object".to_string(),
                        got: other.type_name().to_string(),
                        line,
                    }),
                }
            }
            other => {
                let value = self.eval_expr(other)?;
                self.call_value(value, arg_values, location)
            }
        }
    }

    fn call_value(
        &mut self,
        value: Value,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match value {
            Value::Function(func) => self.call_function(func, args, location),
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name().to_string(),
                line: self.user_line(location),
            }),
        }
    }

    fn call_function(
        &mut self,
        func: Rc<Function>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let call_line = self.user_line(location);
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                name: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
                line: call_line,
            });
        }
        if self.stack.depth() >= RECURSION_LIMIT {
            return Err(RuntimeError::RecursionLimit { line: call_line });
        }

        let mut frame = Frame::new(func.name.clone(), func.traced);
        frame.line = func.line.saturating_sub(self.prelude_lines);
        frame.param_count = func.params.len();
        for (param, arg) in func.params.iter().zip(args) {
            frame.locals.insert(param.clone(), arg);
        }
        self.stack.push(frame);

        if func.traced {
            self.sink.on_event(TraceEvent {
                kind: EventKind::Call,
                line: self.stack.current().line,
                stack: &self.stack,
            });
        }

        let flow = match self.exec_block(&func.body) {
            Ok(flow) => flow,
            Err(e) => {
                self.stack.pop();
                return Err(e);
            }
        };
        let result = match flow {
            Flow::Return(value) => value,
            _ => Value::Null,
        };

        if func.traced {
            self.sink.on_event(TraceEvent {
                kind: EventKind::Return { value: &result },
                line: self.stack.current().line,
                stack: &self.stack,
            });
        }
        self.stack.pop();
        Ok(result)
    }

    fn call_list_method(
        &mut self,
        items: &Rc<RefCell<Vec<Value>>>,
        method: &str,
        mut args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        match method {
            "push" => {
                if args.len() != 1 {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        name: "push".to_string(),
                        expected: 1,
                        got: args.len(),
                        line,
                    });
                }
                items.borrow_mut().push(args.remove(0));
                Ok(Value::Null)
            }
            "pop" => {
                if !args.is_empty() {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        name: "pop".to_string(),
                        expected: 0,
                        got: args.len(),
                        line,
                    });
                }
                items.borrow_mut().pop().ok_or(RuntimeError::EmptyPop {
                    method: "pop".to_string(),
                    line,
                })
            }
            "shift" => {
                if !args.is_empty() {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        name: "shift".to_string(),
                        expected: 0,
                        got: args.len(),
                        line,
                    });
                }
                let mut items = items.borrow_mut();
                if items.is_empty() {
                    return Err(RuntimeError::EmptyPop {
                        method: "shift".to_string(),
                        line,
                    });
                }
                Ok(items.remove(0))
            }
            other => Err(RuntimeError::TypeError {
                expected: "a list method (push, pop, shift)".to_string(),
                got: format!("'{}'", other),
                line,
            }),
        }
    }

    // ========== Assignment targets ==========

    fn assign_target(&mut self, target: &Expr, value: Value) -> Result<(), RuntimeError> {
        match target {
            Expr::Variable(name, _) => {
                self.stack.assign(name, value);
                Ok(())
            }
            Expr::Index {
                object,
                index,
                location,
            } => {
                let obj = self.eval_expr(object)?;
                let idx = self.eval_expr(index)?;
                let line = self.user_line(*location);
                match (obj, idx) {
                    (Value::List(items), Value::Int(i)) => {
                        let mut items = items.borrow_mut();
                        let len = items.len();
                        let resolved =
                            resolve_index(i, len).ok_or(RuntimeError::IndexOutOfBounds {
                                index: i,
                                len,
                                line,
                            })?;
                        items[resolved] = value;
                        Ok(())
                    }
                    (Value::Object(fields), Value::Str(key)) => {
                        fields.borrow_mut().insert(key, value);
                        Ok(())
                    }
                    (obj, idx) => Err(RuntimeError::TypeError {
                        expected: "list[int] or object[string]".to_string(),
                        got: format!("{}[{}]", obj.type_name(), idx.type_name()),
                        line,
                    }),
                }
            }
            Expr::Member {
                object,
                field,
                location,
            } => {
                let obj = self.eval_expr(object)?;
                let line = self.user_line(*location);
                match obj {
                    Value::Object(fields) => {
                        fields.borrow_mut().insert(field.clone(), value);
                        Ok(())
                    }
                    Value::Null => Err(RuntimeError::NullFieldAccess {
                        field: field.clone(),
                        line,
                    }),
                    other => Err(RuntimeError::TypeError {
                        expected: "object".to_string(),
                        got: other.type_name().to_string(),
                        line,
                    }),
                }
            }
            other => Err(RuntimeError::TypeError {
                expected: "assignable expression".to_string(),
                got: format!("{:?}", other.location()),
                line: self.user_line(other.location()),
            }),
        }
    }

    // ========== Operators ==========

    fn eval_binop(
        &self,
        op: BinOp,
        left: Value,
        right: Value,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => match (left, right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_add(b)
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { line }),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (left, right) => self.numeric_float_op(left, right, line, |a, b| a + b),
            },
            BinOp::Sub => match (left, right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_sub(b)
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { line }),
                (left, right) => self.numeric_float_op(left, right, line, |a, b| a - b),
            },
            BinOp::Mul => match (left, right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_mul(b)
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { line }),
                (left, right) => self.numeric_float_op(left, right, line, |a, b| a * b),
            },
            BinOp::Div => match (left, right) {
                (Value::Int(_), Value::Int(0)) => Err(RuntimeError::DivisionByZero { line }),
                // int division truncates toward zero
                (Value::Int(a), Value::Int(b)) => a
                    .checked_div(b)
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { line }),
                (left, right) => self.numeric_float_op(left, right, line, |a, b| a / b),
            },
            BinOp::Mod => match (left, right) {
                (Value::Int(_), Value::Int(0)) => Err(RuntimeError::DivisionByZero { line }),
                (Value::Int(a), Value::Int(b)) => a
                    .checked_rem(b)
                    .map(Value::Int)
                    .ok_or(RuntimeError::IntegerOverflow { line }),
                (left, right) => self.numeric_float_op(left, right, line, |a, b| a % b),
            },
            BinOp::Eq => Ok(Value::Bool(left.loosely_equal(&right))),
            BinOp::Ne => Ok(Value::Bool(!left.loosely_equal(&right))),
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => self.compare(op, left, right, line),
            // short-circuit operators are handled before operand evaluation
            BinOp::And | BinOp::Or => Ok(Value::Bool(
                if matches!(op, BinOp::And) {
                    left.is_truthy() && right.is_truthy()
                } else {
                    left.is_truthy() || right.is_truthy()
                },
            )),
        }
    }

    fn numeric_float_op(
        &self,
        left: Value,
        right: Value,
        line: usize,
        op: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        let (a, b) = match (&left, &right) {
            (Value::Int(a), Value::Float(b)) => (*a as f64, *b),
            (Value::Float(a), Value::Int(b)) => (*a, *b as f64),
            (Value::Float(a), Value::Float(b)) => (*a, *b),
            _ => {
                return Err(RuntimeError::TypeError {
                    expected: "two numbers".to_string(),
                    got: format!("{} and {}", left.type_name(), right.type_name()),
                    line,
                })
            }
        };
        Ok(Value::Float(op(a, b)))
    }

    fn compare(
        &self,
        op: BinOp,
        left: Value,
        right: Value,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        use std::cmp::Ordering;
        let ordering = match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            _ => {
                return Err(RuntimeError::TypeError {
                    expected: "two numbers or two strings".to_string(),
                    got: format!("{} and {}", left.type_name(), right.type_name()),
                    line,
                })
            }
        };
        // NaN compares false under every ordering
        let result = match ordering {
            None => false,
            Some(ord) => match op {
                BinOp::Lt => ord == Ordering::Less,
                BinOp::Le => ord != Ordering::Greater,
                BinOp::Gt => ord == Ordering::Greater,
                BinOp::Ge => ord != Ordering::Less,
                _ => false,
            },
        };
        Ok(Value::Bool(result))
    }

    /// Translate a raw source location into the user's line coordinates.
    /// Errors raised from inside the injected prelude are attributed to the
    /// innermost user frame instead.
    fn user_line(&self, location: SourceLocation) -> usize {
        if location.line > self.prelude_lines {
            return location.line - self.prelude_lines;
        }
        self.stack
            .frames
            .iter()
            .rev()
            .find(|f| f.traced && f.line > 0)
            .map(|f| f.line)
            .unwrap_or(1)
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        index + len as i64
    } else {
        index
    };
    if resolved >= 0 && (resolved as usize) < len {
        Some(resolved as usize)
    } else {
        None
    }
}
