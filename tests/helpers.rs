//! Test utility functions for meetup-ops
#![allow(dead_code)]

use async_trait::async_trait;
use meetup_ops::core::{Fields, RunStatus, Step, StepError, StepKind, StepState, Workflow, WorkflowContext, WorkflowRun};
use meetup_ops::execution::{ExecutionEvent, WorkflowError, WorkflowRunner};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a mock step does when it runs
#[derive(Debug, Clone)]
enum Behavior {
    Write(Fields),
    Fail(String),
    Require(String, Fields),
}

/// Mock step that counts its calls and records the context it was given
#[derive(Clone)]
pub struct MockStep {
    name: String,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<WorkflowContext>>>,
}

impl MockStep {
    fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A step that succeeds and writes `fields`
    pub fn writes(name: &str, fields: Fields) -> Self {
        Self::new(name, Behavior::Write(fields))
    }

    /// A step that always fails with `message`
    pub fn fails(name: &str, message: &str) -> Self {
        Self::new(name, Behavior::Fail(message.to_string()))
    }

    /// A step that needs `field` and then writes `fields`
    pub fn requires(name: &str, field: &str, fields: Fields) -> Self {
        Self::new(name, Behavior::Require(field.to_string(), fields))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Contexts this step was run with
    pub fn seen(&self) -> Vec<WorkflowContext> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Step for MockStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteWrite
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(context.clone());

        match &self.behavior {
            Behavior::Write(fields) => Ok(fields.clone()),
            Behavior::Fail(message) => Err(StepError::Failed(message.clone())),
            Behavior::Require(field, fields) => {
                context.require(field)?;
                Ok(fields.clone())
            }
        }
    }
}

/// Build a workflow from mock steps; the caller keeps clones to inspect counters
pub fn workflow_of(name: &str, steps: &[MockStep]) -> Workflow {
    steps
        .iter()
        .cloned()
        .fold(Workflow::new(name), |workflow, step| workflow.step(step))
}

/// Outcome of a test run
pub struct RunResult {
    pub run: WorkflowRun,
    pub result: Result<(), WorkflowError>,
    pub events: Vec<ExecutionEvent>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.result.is_ok() && self.run.status == RunStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.result.is_err() && self.run.status == RunStatus::Failed
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.run.context
    }

    pub fn failed_step(&self) -> Option<&str> {
        self.result.as_ref().err().and_then(|e| e.failed_step())
    }

    /// Names of steps in the order they were started
    pub fn started_steps(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ExecutionEvent::StepStarted { step, .. } => Some(step.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Run `workflow` from `initial`, capturing every event
pub async fn run_workflow(workflow: &Workflow, initial: Fields) -> RunResult {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let mut runner = WorkflowRunner::new();
    runner.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));

    let mut run = WorkflowRun::new(workflow, WorkflowContext::from_fields(initial));
    let result = runner.execute(workflow, &mut run).await;
    let events = events.lock().unwrap().clone();

    RunResult { run, result, events }
}

/// Assert the run completed
pub fn assert_run_completed(result: &RunResult) {
    assert!(
        result.is_success(),
        "Run should have completed, but was {:?}: {:?}",
        result.run.status,
        result.result
    );
}

/// Assert the run failed at `step` and the error mentions `expected_error`
pub fn assert_run_failed_at(result: &RunResult, step: &str, expected_error: &str) {
    assert!(result.is_failed(), "Run should have failed, but was {:?}", result.run.status);
    assert_eq!(result.failed_step(), Some(step), "wrong failing step");

    let record = result
        .run
        .step(step)
        .unwrap_or_else(|| panic!("Step '{}' not found in run", step));
    match &record.state {
        StepState::Failed { error, .. } => assert!(
            error.contains(expected_error),
            "Step '{}' error:\n{}\n\ndoes not contain:\n{}",
            step,
            error,
            expected_error
        ),
        other => panic!("Step '{}' should have failed, but was {:?}", step, other),
    }
}

/// Assert a context field holds `expected`
pub fn assert_field(result: &RunResult, field: &str, expected: impl Into<Value>) {
    let expected = expected.into();
    assert_eq!(
        result.context().get(field),
        Some(&expected),
        "field '{}' in context {:?}",
        field,
        result.context()
    );
}
