//! Workflow execution

pub mod engine;

pub use engine::{EventHandler, ExecutionEvent, WorkflowError, WorkflowRunner};
