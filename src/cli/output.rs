//! CLI output formatting

use crate::core::{RunStatus, StepKind, StepState, WorkflowContext, WorkflowRun};
use crate::execution::{ExecutionEvent, WorkflowRunner};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner for a step in flight
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Horizontal rule across the terminal
pub fn separator() -> String {
    let width = term_size::dimensions_stdout()
        .map(|(w, _)| w)
        .unwrap_or(80);
    style("─".repeat(width)).dim().to_string()
}

/// Format a step state for display
pub fn format_step_state(state: &StepState) -> String {
    match state {
        StepState::Pending => style("PENDING").dim().to_string(),
        StepState::Running { .. } => style("RUNNING").yellow().to_string(),
        StepState::Completed { .. } => style("COMPLETED").green().to_string(),
        StepState::Failed { .. } => style("FAILED").red().to_string(),
        StepState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::WorkflowStarted {
            execution_id,
            workflow_name,
            total_steps,
        } => format!(
            "{} Starting {} ({} steps, {})",
            ROCKET,
            style(workflow_name).bold(),
            total_steps,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            step,
            kind,
            position,
            total_steps,
        } => format!(
            "{} [{}/{}] {} {}",
            SPINNER,
            position,
            total_steps,
            style(step).cyan(),
            style(format!("({})", kind)).dim()
        ),
        ExecutionEvent::StepCompleted { step, fields } => {
            if fields.is_empty() {
                format!("{} {}", CHECK, style(step).green())
            } else {
                format!(
                    "{} {} {}",
                    CHECK,
                    style(step).green(),
                    style(format!("→ {}", fields.join(", "))).dim()
                )
            }
        }
        ExecutionEvent::StepFailed { step, error, .. } => {
            format!("{} {}: {}", CROSS, style(step).red(), style(error).dim())
        }
        ExecutionEvent::WorkflowCompleted {
            execution_id,
            status,
        } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Per-step progress on the terminal
///
/// Prompt steps print their header and nothing else, since a spinner would
/// redraw over the operator's typing.
#[derive(Default)]
pub struct ConsoleReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register this reporter with a runner
    pub fn attach(self: &Arc<Self>, runner: &mut WorkflowRunner) {
        let reporter = Arc::clone(self);
        runner.add_event_handler(move |event| reporter.handle(event));
    }

    pub fn handle(&self, event: &ExecutionEvent) {
        let line = format_execution_event(event);
        match event {
            ExecutionEvent::StepStarted {
                kind: StepKind::Prompt,
                ..
            } => println!("{}", line),
            ExecutionEvent::StepStarted { .. } => self.start_spinner(line),
            ExecutionEvent::StepCompleted { .. } | ExecutionEvent::StepFailed { .. } => {
                self.stop_spinner();
                println!("{}", line);
            }
            ExecutionEvent::WorkflowStarted { .. } => {
                println!("{}", line);
                println!("{}", separator());
            }
            ExecutionEvent::WorkflowCompleted { .. } => {
                self.stop_spinner();
                println!("{}", separator());
                println!("{}", line);
            }
        }
    }

    fn start_spinner(&self, message: String) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.take() {
                previous.finish_and_clear();
            }
            *slot = Some(create_spinner(message));
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

/// Render the fields of a finished run, one per line
pub fn format_context(context: &WorkflowContext) -> String {
    let width = context.keys().map(|k| k.len()).max().unwrap_or(0);
    context
        .keys()
        .filter_map(|key| context.get(key).map(|value| (key, value)))
        .map(|(key, value)| {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("  {:width$}  {}", style(key).cyan(), shown, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of a finished run
pub fn format_run_summary(run: &WorkflowRun) -> String {
    let duration = match (run.started_at, run.completed_at) {
        (Some(start), Some(end)) => end
            .signed_duration_since(start)
            .to_std()
            .map(format_duration)
            .unwrap_or_default(),
        _ => String::new(),
    };

    format!(
        "{} - {} ({}/{} steps) {}",
        style(&run.workflow_name).bold(),
        format_status(run.status),
        run.completed_steps(),
        run.steps.len(),
        style(duration).dim()
    )
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Fields;
    use uuid::Uuid;

    #[test]
    fn test_plain_fallbacks_are_spaced() {
        for emoji in [&CHECK, &CROSS, &SPINNER, &INFO, &WARN, &ROCKET] {
            assert!(emoji.1.ends_with(' '), "fallback {:?} runs into the text", emoji.1);
        }
    }

    #[test]
    fn test_format_step_events() {
        console::set_colors_enabled(false);

        let started = format_execution_event(&ExecutionEvent::StepStarted {
            step: "duplicate event".to_string(),
            kind: StepKind::RemoteWrite,
            position: 4,
            total_steps: 9,
        });
        assert!(started.contains("[4/9] duplicate event (remote write)"));

        let failed = format_execution_event(&ExecutionEvent::StepFailed {
            step: "duplicate event".to_string(),
            position: 4,
            error: "Tito returned 422: invalid".to_string(),
        });
        assert!(failed.contains("duplicate event: Tito returned 422: invalid"));
    }

    #[test]
    fn test_format_completed_lists_fields() {
        console::set_colors_enabled(false);

        let line = format_execution_event(&ExecutionEvent::StepCompleted {
            step: "duplicate event".to_string(),
            fields: vec!["eventApiId".to_string(), "eventApiUrl".to_string()],
        });
        assert!(line.contains("→ eventApiId, eventApiUrl"));
    }

    #[test]
    fn test_format_workflow_completed_uses_short_id() {
        console::set_colors_enabled(false);

        let id = Uuid::new_v4();
        let line = format_execution_event(&ExecutionEvent::WorkflowCompleted {
            execution_id: id,
            status: RunStatus::Failed,
        });
        assert!(line.contains(&id.to_string()[..8]));
        assert!(line.contains("FAILED"));
    }

    #[test]
    fn test_format_context() {
        console::set_colors_enabled(false);

        let context = WorkflowContext::from_fields(
            Fields::new()
                .with("eventName", "March Meetup")
                .with("mentorIssueNumber", 42),
        );
        let text = format_context(&context);
        assert!(text.contains("March Meetup"));
        assert!(!text.contains("\"March Meetup\""));
        assert!(text.contains("42"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
