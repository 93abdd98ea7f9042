//! Execution state models

use crate::core::{context::WorkflowContext, step::StepKind, workflow::Workflow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall workflow run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Run is in progress
    Running,
    /// Every step succeeded
    Completed,
    /// A step failed and the run stopped
    Failed,
}

/// State of a single step within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepState {
    /// Step has not been reached yet
    Pending,
    /// Step is currently running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Step completed successfully
    Completed {
        /// Names of the fields the step wrote
        fields: Vec<String>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Step failed; the run stopped here
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Step never ran because an earlier step failed
    Skipped {
        reason: String,
    },
}

impl StepState {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Completed { .. } | StepState::Failed { .. } | StepState::Skipped { .. }
        )
    }
}

/// Per-step record kept on the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub kind: StepKind,
    pub state: StepState,
}

/// One run of a workflow: its context plus progress bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub workflow_name: String,

    pub status: RunStatus,

    /// Fields accumulated so far
    pub context: WorkflowContext,

    /// One record per step, in workflow order
    pub steps: Vec<StepRecord>,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Create a pending run of `workflow` starting from `context`
    pub fn new(workflow: &Workflow, context: WorkflowContext) -> Self {
        let steps = workflow
            .steps()
            .iter()
            .map(|s| StepRecord {
                name: s.name().to_string(),
                kind: s.kind(),
                state: StepState::Pending,
            })
            .collect();

        Self {
            execution_id: Uuid::new_v4(),
            workflow_name: workflow.name.clone(),
            status: RunStatus::Pending,
            context,
            steps,
            started_at: None,
            completed_at: None,
        }
    }

    /// Mark run as started
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark run as completed
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark run as failed
    pub fn fail(&mut self) {
        self.status = RunStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// The step that stopped the run, if any
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps
            .iter()
            .find(|s| matches!(s.state, StepState::Failed { .. }))
    }

    pub fn completed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.state, StepState::Completed { .. }))
            .count()
    }

    /// Calculate progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.completed_steps() as f64 / self.steps.len() as f64
    }
}
