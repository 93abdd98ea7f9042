//! Community calendar submission

use crate::clients::{CalendarEntry, CalendarForm};
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub struct SubmitCalendarStep {
    form: Arc<dyn CalendarForm>,
}

impl SubmitCalendarStep {
    pub fn new(form: Arc<dyn CalendarForm>) -> Self {
        Self { form }
    }

    fn entry(context: &WorkflowContext) -> Result<CalendarEntry, StepError> {
        Ok(CalendarEntry {
            title: context.require_str("eventTitle")?.to_string(),
            date: context.require_str("eventDate")?.to_string(),
            time: context.require_str("eventTime")?.to_string(),
            location: context.require_str("eventLocation")?.to_string(),
            url: context.require_str("eventUrl")?.to_string(),
        })
    }
}

#[async_trait]
impl Step for SubmitCalendarStep {
    fn name(&self) -> &str {
        "submit calendar"
    }

    fn kind(&self) -> StepKind {
        StepKind::Browser
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let entry = Self::entry(context)?;
        let link = self.form.submit(&entry).await?;
        info!("Calendar submission confirmed at {}", link);

        Ok(Fields::new().with("calendarSubmissionUrl", link))
    }
}
