//! Step domain model

use crate::clients::{ApiError, BrowserError, CanvasError, SiteError};
use crate::core::context::{Fields, WorkflowContext};
use crate::core::template::TemplateError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The category a step belongs to, used for display and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// Collects answers from the operator
    Prompt,
    /// Creates or updates something on a remote service
    RemoteWrite,
    /// Reads from a remote service
    RemoteRead,
    /// Drives a browser session
    Browser,
    /// Writes files or spawns a build/publish process
    External,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepKind::Prompt => "prompt",
            StepKind::RemoteWrite => "remote write",
            StepKind::RemoteRead => "remote read",
            StepKind::Browser => "browser",
            StepKind::External => "external",
        };
        f.write_str(label)
    }
}

/// Errors a step can fail with
#[derive(Debug, Error)]
pub enum StepError {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' is not a {expected}")]
    InvalidField { field: String, expected: &'static str },

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Failed(String),
}

/// A single named unit of work in a workflow
///
/// A step reads what it needs from the context and returns only the fields it
/// produces; the runner merges them. A step never sees fields from steps that
/// run after it.
#[async_trait]
pub trait Step: Send + Sync {
    /// Human-readable step label, reported when the step fails
    fn name(&self) -> &str;

    fn kind(&self) -> StepKind;

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError>;
}

type StepFn = dyn Fn(&WorkflowContext) -> Result<Fields, StepError> + Send + Sync;

/// A step backed by a plain closure
pub struct FnStep {
    name: String,
    kind: StepKind,
    func: Box<StepFn>,
}

impl FnStep {
    pub fn new<F>(name: impl Into<String>, kind: StepKind, func: F) -> Self
    where
        F: Fn(&WorkflowContext) -> Result<Fields, StepError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

#[async_trait]
impl Step for FnStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        self.kind
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        (self.func)(context)
    }
}
