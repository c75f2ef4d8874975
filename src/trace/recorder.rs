//! Step recording
//!
//! [`StepRecorder`] is the event sink the sandbox plugs into the
//! interpreter. For every event it snapshots the merged variable view, the
//! call stack, the output tail, and the detected structures into one
//! [`Step`], appending to shared storage the sandbox reads back after the
//! worker finishes (or is abandoned on timeout).

use crate::interpreter::{EventKind, EventSink, TraceEvent};
use crate::runtime::{Frame, SNIPPET_FILENAME};
use crate::sandbox::prepare::HELPER_NAMES;
use crate::trace::classify::{detect_visuals, FocusPolicy};
use crate::trace::serialize::serialize_value;
use crate::trace::{CallFrame, OutputBuffer, SharedSteps, Step, OUTPUT_TAIL};

pub struct StepRecorder {
    steps: SharedSteps,
    output: OutputBuffer,
    policy: FocusPolicy,
    max_steps: usize,
}

impl StepRecorder {
    pub fn new(
        steps: SharedSteps,
        output: OutputBuffer,
        policy: FocusPolicy,
        max_steps: usize,
    ) -> Self {
        StepRecorder {
            steps,
            output,
            policy,
            max_steps,
        }
    }

    fn at_capacity(&self) -> bool {
        let steps = match self.steps.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        steps.len() >= self.max_steps
    }

    fn push_step(&self, step: Step) {
        let mut steps = match self.steps.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if steps.len() < self.max_steps {
            steps.push(step);
        }
    }
}

fn hidden(name: &str) -> bool {
    name.starts_with("__") || HELPER_NAMES.contains(&name)
}

fn frame_args(frame: &Frame) -> serde_json::Map<String, serde_json::Value> {
    frame
        .args()
        .map(|(name, value)| (name.clone(), serialize_value(value)))
        .collect()
}

/// Stack discipline shows up as an operation tag when the snippet names its
/// functions push / pop / peek. Call and line events only; a return step
/// carries the result instead.
fn tag_operation(step: &mut Step, frame: &Frame) {
    match frame.function.as_str() {
        "push" => {
            if let Some(value) = frame.locals.get("value") {
                step.operation = Some("push".to_string());
                step.operation_value = Some(serialize_value(value));
            }
        }
        "pop" => step.operation = Some("pop".to_string()),
        "peek" => step.operation = Some("peek".to_string()),
        _ => {}
    }
}

impl EventSink for StepRecorder {
    fn on_event(&mut self, event: TraceEvent<'_, '_>) {
        if self.at_capacity() {
            return;
        }
        let frame = event.stack.current();
        let mut step = Step {
            line: Some(event.line),
            ..Step::default()
        };

        // merged view over all traced frames, innermost binding wins
        let mut variables = serde_json::Map::new();
        for stack_frame in event.stack.frames.iter().rev() {
            if !stack_frame.traced {
                continue;
            }
            for (name, value) in &stack_frame.locals {
                if hidden(name) || variables.contains_key(name.as_str()) {
                    continue;
                }
                variables.insert(name.clone(), serialize_value(value));
            }
        }
        let scalars: serde_json::Map<String, serde_json::Value> = variables
            .iter()
            .filter(|(_, value)| value.is_boolean() || value.is_number() || value.is_string())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        step.variables = Some(variables);
        if !scalars.is_empty() {
            step.scalars = Some(scalars);
        }
        step.output = Some(self.output.tail(OUTPUT_TAIL));
        step.call_stack = Some(
            event
                .stack
                .frames
                .iter()
                .filter(|f| f.traced)
                .map(|f| CallFrame {
                    function: f.function.clone(),
                    filename: SNIPPET_FILENAME.to_string(),
                    line_number: f.line,
                })
                .collect(),
        );

        match event.kind {
            EventKind::Call => {
                step.note = Some(format!("function entry: {}", frame.function));
                step.function_args = Some(frame_args(frame));
                tag_operation(&mut step, frame);
            }
            EventKind::Line => {
                step.function_args = Some(frame_args(frame));
                tag_operation(&mut step, frame);
            }
            EventKind::Return { value } => {
                step.note = Some(format!("function return: {}", frame.function));
                step.return_value = Some(serialize_value(value));
            }
        }

        match detect_visuals(&frame.locals, Some(frame.function.as_str()), self.policy) {
            Ok(visuals) if !visuals.is_empty() => {
                step.visual = Some(visuals[0].clone());
                step.visuals = Some(visuals);
            }
            Ok(_) => {}
            Err(e) => {
                step.debug_error = Some(e.to_string());
                step.debug_vars = Some(frame.locals.keys().cloned().collect());
            }
        }

        self.push_step(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter;
    use crate::parser::Parser;
    use crate::trace::{SharedSteps, VisualKind};
    use std::sync::{Arc, Mutex};

    fn trace(source: &str) -> Vec<Step> {
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        let steps: SharedSteps = Arc::new(Mutex::new(Vec::new()));
        let output = OutputBuffer::new();
        let mut recorder = StepRecorder::new(
            steps.clone(),
            output.clone(),
            FocusPolicy::default(),
            1000,
        );
        interpreter::run(&program, 0, output, &mut recorder).unwrap();
        let guard = steps.lock().unwrap();
        guard.clone()
    }

    #[test]
    fn test_steps_capture_variables_and_output() {
        let steps = trace("x = 41;\nprint(x);\nx = x + 1;");
        assert_eq!(steps.len(), 4);
        // the step for a line is captured before the line runs
        assert_eq!(steps[1].variables.as_ref().unwrap()["x"], 41);
        assert_eq!(steps[1].output.as_deref(), Some(""));
        assert_eq!(steps[2].output.as_deref(), Some("41\n"));
        assert_eq!(steps[2].scalars.as_ref().unwrap()["x"], 41);
        // the module return step carries the final state
        let final_step = &steps[3];
        assert_eq!(
            final_step.note.as_deref(),
            Some("function return: <module>")
        );
        assert_eq!(final_step.variables.as_ref().unwrap()["x"], 42);
    }

    #[test]
    fn test_entry_and_return_notes() {
        let steps = trace("function f(a) {\n    return a;\n}\nr = f(7);");
        let notes: Vec<Option<&str>> = steps.iter().map(|s| s.note.as_deref()).collect();
        assert!(notes.contains(&Some("function entry: f")));
        assert!(notes.contains(&Some("function return: f")));
        let entry = steps
            .iter()
            .find(|s| s.note.as_deref() == Some("function entry: f"))
            .unwrap();
        assert_eq!(entry.function_args.as_ref().unwrap()["a"], 7);
        let ret = steps
            .iter()
            .find(|s| s.note.as_deref() == Some("function return: f"))
            .unwrap();
        assert_eq!(ret.return_value.as_ref().unwrap(), &serde_json::json!(7));
    }

    #[test]
    fn test_call_stack_outermost_first() {
        let steps = trace("function f() {\n    return 0;\n}\nr = f();");
        let entry = steps
            .iter()
            .find(|s| s.note.as_deref() == Some("function entry: f"))
            .unwrap();
        let stack = entry.call_stack.as_ref().unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0].function, "<module>");
        assert_eq!(stack[1].function, "f");
        assert_eq!(stack[1].filename, "<snippet>");
    }

    #[test]
    fn test_push_operation_detected() {
        let source = "\
function push(stack, value) {\n    stack.push(value);\n}\n\
s = [];\npush(s, 9);";
        let steps = trace(source);
        let op_step = steps
            .iter()
            .find(|s| s.operation.as_deref() == Some("push"))
            .expect("no push operation step");
        assert_eq!(op_step.operation_value.as_ref(), Some(&serde_json::json!(9)));
    }

    #[test]
    fn test_return_steps_carry_no_operation() {
        let source = "\
function pop(stack) {\n    return stack.pop();\n}\n\
s = [1, 2];\nx = pop(s);";
        let steps = trace(source);
        assert!(steps
            .iter()
            .any(|s| s.operation.as_deref() == Some("pop")));
        let ret = steps
            .iter()
            .find(|s| s.note.as_deref() == Some("function return: pop"))
            .expect("no return step");
        assert!(ret.operation.is_none());
    }

    #[test]
    fn test_visuals_on_array_step() {
        let steps = trace("arr = [3, 1, 2];\ni = 0;");
        let last = steps.last().unwrap();
        let visuals = last.visuals.as_ref().expect("no visuals");
        assert_eq!(visuals[0].kind, VisualKind::Array);
        assert_eq!(visuals[0].name, "arr");
        // visual mirrors visuals[0]
        assert_eq!(last.visual.as_ref().unwrap().name, "arr");
    }

    #[test]
    fn test_step_cap() {
        let source = "i = 0;\nwhile (i < 5000) {\n    i += 1;\n}";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();
        let steps: SharedSteps = Arc::new(Mutex::new(Vec::new()));
        let output = OutputBuffer::new();
        let mut recorder =
            StepRecorder::new(steps.clone(), output.clone(), FocusPolicy::default(), 50);
        interpreter::run(&program, 0, output, &mut recorder).unwrap();
        assert_eq!(steps.lock().unwrap().len(), 50);
    }

    #[test]
    fn test_inner_binding_shadows_global_in_merged_view() {
        let source = "x = 1;\nfunction f() {\n    x = 2;\n    return x;\n}\nr = f();";
        let steps = trace(source);
        let ret = steps
            .iter()
            .find(|s| s.note.as_deref() == Some("function return: f"))
            .unwrap();
        assert_eq!(ret.variables.as_ref().unwrap()["x"], 2);
    }
}
