//! meetup-ops - one-shot chores for running a community meetup

pub mod cli;
pub mod clients;
pub mod core;
pub mod execution;
pub mod steps;
pub mod workflows;

// Re-export commonly used types
pub use core::{Config, Fields, FnStep, RunStatus, Step, StepError, StepKind, StepState, Workflow, WorkflowContext, WorkflowRun};
pub use execution::{ExecutionEvent, WorkflowError, WorkflowRunner};
