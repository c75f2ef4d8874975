//! Sandboxed execution
//!
//! Runs a snippet on a worker thread and collects its trace. The worker
//! shares the step storage with the caller, so when a snippet spins forever
//! the caller can walk away at the deadline with every step recorded so far
//! plus a timeout marker; the abandoned worker stops recording on its own
//! once the step cap is hit.

pub mod prepare;

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::interpreter::{self, RuntimeError};
use crate::parser::{ParseError, Parser};
use crate::trace::{
    FocusPolicy, OutputBuffer, SharedSteps, Step, StepRecorder, MAX_STEPS,
};
use prepare::{prepare, Prepared};

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub timeout: Duration,
    pub max_steps: usize,
    pub policy: FocusPolicy,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        SandboxConfig {
            timeout: Duration::from_secs(10),
            max_steps: MAX_STEPS,
            policy: FocusPolicy::default(),
        }
    }
}

/// Trace a snippet with the default limits
pub fn trace_source(user_code: &str) -> Vec<Step> {
    trace_source_with(user_code, &SandboxConfig::default())
}

/// Trace a snippet, returning the recorded steps in execution order
pub fn trace_source_with(user_code: &str, config: &SandboxConfig) -> Vec<Step> {
    let steps: SharedSteps = Arc::new(Mutex::new(Vec::new()));
    let prepared = prepare(user_code);
    debug!(
        prelude_lines = prepared.prelude_lines,
        source_len = prepared.source.len(),
        "starting traced run"
    );

    let (done_tx, done_rx) = mpsc::channel::<()>();
    let worker_steps = steps.clone();
    let policy = config.policy;
    let max_steps = config.max_steps;
    let spawned = thread::Builder::new()
        .name("snippet-worker".to_string())
        .spawn(move || {
            if let Err(step) = execute(&prepared, worker_steps.clone(), policy, max_steps) {
                push_step(&worker_steps, step);
            }
            let _ = done_tx.send(());
        });

    if let Err(e) = spawned {
        error!(error = %e, "failed to spawn snippet worker");
        return vec![error_step(format!("Error: {}", e))];
    }

    match done_rx.recv_timeout(config.timeout) {
        Ok(()) => {}
        Err(mpsc::RecvTimeoutError::Timeout) => {
            // the worker is abandoned; the step cap keeps it from growing
            // the shared trace behind our back
            warn!(timeout = ?config.timeout, "snippet execution timed out");
            push_step(&steps, error_step("Execution timed out."));
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            error!("snippet worker exited without reporting");
            push_step(&steps, error_step("Error: execution failed unexpectedly"));
        }
    }

    let mut collected = {
        let guard = match steps.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    };

    // lead with a snapshot of the structures as they were before any step
    if let Some(visuals) = collected.first().and_then(|s| s.visuals.clone()) {
        let initial = Step {
            line: Some(0),
            variables: Some(serde_json::Map::new()),
            output: Some(String::new()),
            call_stack: Some(Vec::new()),
            note: Some("initial state".to_string()),
            visual: visuals.first().cloned(),
            visuals: Some(visuals),
            ..Step::default()
        };
        collected.insert(0, initial);
    }

    collected
}

fn execute(
    prepared: &Prepared,
    steps: SharedSteps,
    policy: FocusPolicy,
    max_steps: usize,
) -> Result<(), Step> {
    let mut parser = Parser::new(&prepared.source)
        .map_err(|e| error_step(syntax_error_message(&e, prepared.prelude_lines)))?;
    let program = parser
        .parse_program()
        .map_err(|e| error_step(syntax_error_message(&e, prepared.prelude_lines)))?;

    let output = OutputBuffer::new();
    let mut recorder = StepRecorder::new(steps, output.clone(), policy, max_steps);
    interpreter::run(&program, prepared.prelude_lines, output, &mut recorder)
        .map_err(|e| error_step(runtime_error_message(&e)))
}

fn syntax_error_message(e: &ParseError, prelude_lines: usize) -> String {
    let line = e.location.line.saturating_sub(prelude_lines).max(1);
    format!("Syntax error at line {}: {}", line, e.message)
}

fn runtime_error_message(e: &RuntimeError) -> String {
    match e {
        RuntimeError::UndefinedVariable { name, .. } if name == "head" => format!(
            "Error: Variable 'head' is not defined. Make sure to create your linked list \
             first.\n\nExample:\nhead = ListNode(1, ListNode(2, ListNode(3, null)))\n\n{}",
            e
        ),
        RuntimeError::UndefinedVariable { name, .. } => format!(
            "Error: Variable '{}' is not defined. Make sure to define it before using it.\n\n{}",
            name, e
        ),
        other => format!("Error: {}", other),
    }
}

fn error_step(message: impl Into<String>) -> Step {
    Step {
        error: Some(message.into()),
        ..Step::default()
    }
}

fn push_step(steps: &SharedSteps, step: Step) {
    let mut guard = match steps.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.push(step);
}
