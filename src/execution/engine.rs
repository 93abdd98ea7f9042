//! Workflow runner - executes steps in order and stops at the first failure

use crate::core::{RunStatus, StepError, StepKind, StepState, Workflow, WorkflowRun};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Events emitted while a workflow runs
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    WorkflowStarted {
        execution_id: Uuid,
        workflow_name: String,
        total_steps: usize,
    },
    StepStarted {
        step: String,
        kind: StepKind,
        /// 1-based position in the workflow
        position: usize,
        total_steps: usize,
    },
    StepCompleted {
        step: String,
        fields: Vec<String>,
    },
    StepFailed {
        step: String,
        position: usize,
        error: String,
    },
    WorkflowCompleted {
        execution_id: Uuid,
        status: RunStatus,
    },
}

/// Why a run did not complete
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("step '{step}' (step {position}) failed: {source}")]
    StepFailed {
        step: String,
        position: usize,
        #[source]
        source: StepError,
    },

    #[error("invalid workflow: {0}")]
    Invalid(String),
}

impl WorkflowError {
    /// Name of the step that failed, if a step failed
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            WorkflowError::StepFailed { step, .. } => Some(step),
            WorkflowError::Invalid(_) => None,
        }
    }
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Sequential workflow runner
///
/// Steps run strictly one after another. Each step's output is merged into
/// the run's context before the next step starts. The first failing step ends
/// the run: later steps are marked skipped and never execute, and nothing the
/// earlier steps did is undone.
#[derive(Clone, Default)]
pub struct WorkflowRunner {
    event_handlers: Vec<EventHandler>,
}

impl WorkflowRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute `workflow`, accumulating fields into `run.context`
    pub async fn execute(&self, workflow: &Workflow, run: &mut WorkflowRun) -> Result<(), WorkflowError> {
        workflow.validate().map_err(WorkflowError::Invalid)?;
        if run.steps.len() != workflow.len() {
            return Err(WorkflowError::Invalid(format!(
                "run tracks {} steps but workflow '{}' has {}",
                run.steps.len(),
                workflow.name,
                workflow.len()
            )));
        }

        let execution_id = run.execution_id;
        let total_steps = workflow.len();

        info!("Starting workflow: {} ({})", workflow.name, execution_id);
        run.start();
        self.emit_event(ExecutionEvent::WorkflowStarted {
            execution_id,
            workflow_name: workflow.name.clone(),
            total_steps,
        });

        for (index, step) in workflow.steps().iter().enumerate() {
            let position = index + 1;
            let name = step.name().to_string();
            let started_at = Utc::now();

            run.steps[index].state = StepState::Running { started_at };
            self.emit_event(ExecutionEvent::StepStarted {
                step: name.clone(),
                kind: step.kind(),
                position,
                total_steps,
            });
            debug!("Running step {}/{}: {}", position, total_steps, name);

            match step.run(&run.context).await {
                Ok(fields) => {
                    let written: Vec<String> = fields.keys().cloned().collect();
                    run.context.merge(fields);
                    run.steps[index].state = StepState::Completed {
                        fields: written.clone(),
                        started_at,
                        completed_at: Utc::now(),
                    };
                    info!("Step {} completed ({} fields)", name, written.len());
                    self.emit_event(ExecutionEvent::StepCompleted {
                        step: name,
                        fields: written,
                    });
                }
                Err(err) => {
                    error!("Step {} failed: {}", name, err);
                    run.steps[index].state = StepState::Failed {
                        error: err.to_string(),
                        started_at,
                        failed_at: Utc::now(),
                    };
                    for record in &mut run.steps[position..] {
                        record.state = StepState::Skipped {
                            reason: format!("step '{}' failed", name),
                        };
                    }
                    run.fail();

                    self.emit_event(ExecutionEvent::StepFailed {
                        step: name.clone(),
                        position,
                        error: err.to_string(),
                    });
                    self.emit_event(ExecutionEvent::WorkflowCompleted {
                        execution_id,
                        status: RunStatus::Failed,
                    });

                    return Err(WorkflowError::StepFailed {
                        step: name,
                        position,
                        source: err,
                    });
                }
            }
        }

        run.complete();
        info!("Workflow finished: {} - {:?}", workflow.name, run.status);
        self.emit_event(ExecutionEvent::WorkflowCompleted {
            execution_id,
            status: RunStatus::Completed,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fields, FnStep, WorkflowContext};
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_execute_simple_workflow() {
        let workflow = Workflow::new("test")
            .step(FnStep::new("first", StepKind::Prompt, |_| {
                Ok(Fields::new().with("a", "1"))
            }))
            .step(FnStep::new("second", StepKind::RemoteWrite, |ctx| {
                let a = ctx.require_str("a")?;
                Ok(Fields::new().with("b", format!("{}+1", a)))
            }));

        let mut run = WorkflowRun::new(&workflow, WorkflowContext::new());
        let runner = WorkflowRunner::new();

        let result = runner.execute(&workflow, &mut run).await;
        assert!(result.is_ok());
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.context.get_str("b"), Some("1+1"));
        assert_eq!(run.completed_steps(), 2);
    }

    #[tokio::test]
    async fn test_failure_skips_remaining_steps() {
        let workflow = Workflow::new("test")
            .step(FnStep::new("first", StepKind::Prompt, |_| {
                Ok(Fields::new().with("a", "1"))
            }))
            .step(FnStep::new("second", StepKind::RemoteWrite, |_| {
                Err(StepError::Failed("boom".to_string()))
            }))
            .step(FnStep::new("third", StepKind::External, |_| {
                Ok(Fields::new().with("c", "3"))
            }));

        let mut run = WorkflowRun::new(&workflow, WorkflowContext::new());
        let err = WorkflowRunner::new()
            .execute(&workflow, &mut run)
            .await
            .unwrap_err();

        assert_eq!(err.failed_step(), Some("second"));
        assert!(err.to_string().contains("boom"));
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.context.contains("a"));
        assert!(!run.context.contains("c"));
        assert!(matches!(run.steps[2].state, StepState::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_events_are_emitted_in_order() {
        let workflow = Workflow::new("test")
            .step(FnStep::new("only", StepKind::External, |_| Ok(Fields::new())));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut runner = WorkflowRunner::new();
        let sink = seen.clone();
        runner.add_event_handler(move |event| {
            let label = match event {
                ExecutionEvent::WorkflowStarted { .. } => "workflow-started",
                ExecutionEvent::StepStarted { .. } => "step-started",
                ExecutionEvent::StepCompleted { .. } => "step-completed",
                ExecutionEvent::StepFailed { .. } => "step-failed",
                ExecutionEvent::WorkflowCompleted { .. } => "workflow-completed",
            };
            sink.lock().unwrap().push(label);
        });

        let mut run = WorkflowRun::new(&workflow, WorkflowContext::new());
        runner.execute(&workflow, &mut run).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["workflow-started", "step-started", "step-completed", "workflow-completed"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_step_names_rejected_before_running() {
        let workflow = Workflow::new("test")
            .step(FnStep::new("same", StepKind::External, |_| Ok(Fields::new().with("x", 1))))
            .step(FnStep::new("same", StepKind::External, |_| Ok(Fields::new())));

        let mut run = WorkflowRun::new(&workflow, WorkflowContext::new());
        let err = WorkflowRunner::new().execute(&workflow, &mut run).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Invalid(_)));
        assert!(run.context.is_empty());
        assert_eq!(run.status, RunStatus::Pending);
    }
}
