//! Interactive prompt step
//!
//! Answers that fail validation are re-asked; they never fail the workflow.
//! Questions whose field is already in the context are not asked again.

use crate::core::text::parse_event_date;
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use console::{style, Term};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// How an answer is checked and normalized
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Any non-blank answer; the message is shown otherwise
    Required(String),
    /// A calendar date, stored as `YYYY-MM-DD`
    Date(String),
}

impl Validation {
    /// Validate `input`, returning the value to store or a message for the operator
    pub fn apply(&self, input: &str) -> Result<Value, String> {
        let input = input.trim();
        match self {
            Validation::Required(message) => {
                if input.is_empty() {
                    Err(message.clone())
                } else {
                    Ok(Value::String(input.to_string()))
                }
            }
            Validation::Date(message) => {
                if input.is_empty() {
                    return Err(message.clone());
                }
                parse_event_date(input)
                    .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                    .ok_or_else(|| format!("'{}' is not a date (MM/DD/YY)", input))
            }
        }
    }
}

/// A single question
#[derive(Debug, Clone)]
pub struct Question {
    /// Context field the answer is stored under
    pub field: String,
    pub message: String,
    /// Used when the operator just presses enter
    pub default: Option<String>,
    pub validation: Validation,
}

impl Question {
    pub fn new(field: impl Into<String>, message: impl Into<String>, validation: Validation) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            default: None,
            validation,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Where answers come from
pub trait PromptSource: Send + Sync {
    /// Ask `question` and return the raw answer
    fn ask(&self, question: &Question) -> Result<String, StepError>;

    /// Tell the operator why an answer was not accepted
    fn reject(&self, question: &Question, message: &str);
}

/// Reads answers from the controlling terminal
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self { term: Term::stdout() }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptSource for TerminalPrompt {
    fn ask(&self, question: &Question) -> Result<String, StepError> {
        let hint = question
            .default
            .as_ref()
            .map(|d| format!(" {}", style(format!("({})", d)).dim()))
            .unwrap_or_default();

        self.term
            .write_str(&format!(
                "{} {}{} ",
                style("?").green(),
                style(&question.message).bold(),
                hint
            ))
            .map_err(|e| StepError::Prompt(e.to_string()))?;

        self.term
            .read_line()
            .map_err(|e| StepError::Prompt(e.to_string()))
    }

    fn reject(&self, _question: &Question, message: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {}", style(">>").red(), message));
    }
}

/// Pre-recorded answers, consumed in order
#[derive(Debug, Default)]
pub struct ScriptedAnswers {
    answers: Mutex<VecDeque<String>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedAnswers {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            rejections: Mutex::new(Vec::new()),
        }
    }

    /// Validation messages shown so far
    pub fn rejections(&self) -> Vec<String> {
        self.rejections
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl PromptSource for ScriptedAnswers {
    fn ask(&self, question: &Question) -> Result<String, StepError> {
        self.answers
            .lock()
            .map_err(|e| StepError::Prompt(e.to_string()))?
            .pop_front()
            .ok_or_else(|| StepError::Prompt(format!("no answer left for '{}'", question.field)))
    }

    fn reject(&self, _question: &Question, message: &str) {
        if let Ok(mut rejections) = self.rejections.lock() {
            rejections.push(message.to_string());
        }
    }
}

/// Asks a fixed list of questions
pub struct PromptStep {
    name: String,
    questions: Vec<Question>,
    source: Arc<dyn PromptSource>,
}

impl PromptStep {
    pub fn new(name: impl Into<String>, questions: Vec<Question>, source: Arc<dyn PromptSource>) -> Self {
        Self {
            name: name.into(),
            questions,
            source,
        }
    }
}

#[async_trait]
impl Step for PromptStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::Prompt
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let mut fields = Fields::new();

        for question in &self.questions {
            if context.contains(&question.field) {
                debug!("Skipping prompt for '{}', already answered", question.field);
                continue;
            }

            loop {
                let source = Arc::clone(&self.source);
                let asked = question.clone();
                let raw = tokio::task::spawn_blocking(move || source.ask(&asked))
                    .await
                    .map_err(|e| StepError::Prompt(e.to_string()))??;
                let input = match (raw.trim(), &question.default) {
                    ("", Some(default)) => default.clone(),
                    (answer, _) => answer.to_string(),
                };

                match question.validation.apply(&input) {
                    Ok(value) => {
                        fields.insert(question.field.clone(), value);
                        break;
                    }
                    Err(message) => {
                        debug!("Rejected answer for '{}': {}", question.field, message);
                        self.source.reject(question, &message);
                    }
                }
            }
        }

        Ok(fields)
    }
}
