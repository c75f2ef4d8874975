//! Call stack and variable scoping
//!
//! Scoping is two-level: name reads resolve in the current frame first and
//! fall back to module globals; bare assignment always binds in the current
//! frame. Frame 0 is the module frame, so at top level the two coincide.

use indexmap::IndexMap;

use crate::runtime::value::Value;

/// Filename reported in trace call stacks
pub const SNIPPET_FILENAME: &str = "<snippet>";

/// Function name of the module-level frame
pub const MODULE_FUNCTION: &str = "<module>";

/// One activation record
#[derive(Debug)]
pub struct Frame {
    pub function: String,
    /// Current line in user-relative coordinates. Only updated for
    /// statements inside the user's own region of the source.
    pub line: usize,
    /// False for frames of injected helper functions
    pub traced: bool,
    /// Parameters are the first `param_count` entries of `locals`
    pub param_count: usize,
    pub locals: IndexMap<String, Value>,
}

impl Frame {
    pub fn new(function: impl Into<String>, traced: bool) -> Self {
        Frame {
            function: function.into(),
            line: 0,
            traced,
            param_count: 0,
            locals: IndexMap::new(),
        }
    }

    /// Current values of the frame's parameters, in declaration order
    pub fn args(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.locals.iter().take(self.param_count)
    }
}

/// The interpreter call stack. Always holds at least the module frame.
#[derive(Debug)]
pub struct CallStack {
    pub frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            frames: vec![Frame::new(MODULE_FUNCTION, true)],
        }
    }

    pub fn current(&self) -> &Frame {
        // Invariant: the module frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Resolve a name: current frame first, then module globals
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.current().locals.get(name) {
            return Some(value.clone());
        }
        self.frames[0].locals.get(name).cloned()
    }

    /// Bind a name in the current frame
    pub fn assign(&mut self, name: &str, value: Value) {
        self.current_mut().locals.insert(name.to_string(), value);
    }
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack::new()
    }
}
