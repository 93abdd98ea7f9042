//! Static site steps: the event data file, build and publish

use crate::clients::SiteBuilder;
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

/// Writes the event record the site build reads
pub struct WriteSiteDataStep {
    site: SiteBuilder,
    data_file: PathBuf,
}

impl WriteSiteDataStep {
    pub fn new(site: SiteBuilder, data_file: impl Into<PathBuf>) -> Self {
        Self {
            site,
            data_file: data_file.into(),
        }
    }
}

#[async_trait]
impl Step for WriteSiteDataStep {
    fn name(&self) -> &str {
        "write site data"
    }

    fn kind(&self) -> StepKind {
        StepKind::External
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let data = json!({
            "name": context.require_str("eventName")?,
            "locationName": context.require_str("eventLocationName")?,
            "location": context.require_str("eventLocation")?,
            "date": context.require_str("eventDate")?,
            "time": context.require_str("eventTime")?,
            "coordinates": context.require("eventCoordinates")?,
            "url": context.require_str("eventUrl")?,
            "mentorRegistrationUrl": context.require_str("mentorRegistrationUrl")?,
        });

        let path = self.site.write_data(&self.data_file, &data).await?;
        Ok(Fields::new().with("siteDataPath", path.display().to_string()))
    }
}

/// Runs a site command (build, publish) in the site root
pub struct RunCommandStep {
    name: String,
    site: SiteBuilder,
    argv: Vec<String>,
}

impl RunCommandStep {
    pub fn new(name: impl Into<String>, site: SiteBuilder, argv: Vec<String>) -> Self {
        Self {
            name: name.into(),
            site,
            argv,
        }
    }
}

#[async_trait]
impl Step for RunCommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::External
    }

    async fn run(&self, _context: &WorkflowContext) -> Result<Fields, StepError> {
        let output = self.site.run_command(&self.argv).await?;
        if !output.trim().is_empty() {
            debug!("{} output:\n{}", self.name, output.trim_end());
        }
        Ok(Fields::new())
    }
}
