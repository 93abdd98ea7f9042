//! Mentor registration issue

use crate::clients::{IssueTracker, NewIssue};
use crate::core::template::render;
use crate::core::text::{long_date, parse_event_date};
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct CreateMentorIssueStep {
    tracker: Arc<dyn IssueTracker>,
    template: String,
}

impl CreateMentorIssueStep {
    pub fn new(tracker: Arc<dyn IssueTracker>, template: impl Into<String>) -> Self {
        Self {
            tracker,
            template: template.into(),
        }
    }

    fn issue(&self, context: &WorkflowContext) -> Result<NewIssue, StepError> {
        let name = context.require_str("eventName")?;
        let location_name = context.require_str("eventLocationName")?;
        let time = context.require_str("eventTime")?;
        let date = context.require_str("eventDate")?;
        let date = parse_event_date(date).ok_or_else(|| StepError::InvalidField {
            field: "eventDate".to_string(),
            expected: "date",
        })?;

        let body = render(
            &self.template,
            &json!({
                "locationName": location_name,
                "date": long_date(date),
                "time": time,
            }),
        )?;

        Ok(NewIssue {
            title: format!("Mentor Registration: {} at {}", name, location_name),
            body,
        })
    }
}

#[async_trait]
impl Step for CreateMentorIssueStep {
    fn name(&self) -> &str {
        "create mentor issue"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteWrite
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let issue = self.issue(context)?;
        let created = self.tracker.create_issue(&issue).await?;
        info!("Mentor registration issue #{} at {}", created.number, created.html_url);

        Ok(Fields::new()
            .with("mentorRegistrationUrl", created.html_url)
            .with("mentorIssueNumber", created.number))
    }
}
