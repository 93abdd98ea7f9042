//! Social preview image: screenshot the preview page, then fit it to the canvas

use crate::clients::canvas::{compress_social_image, SOCIAL_HEIGHT, SOCIAL_WIDTH};
use crate::clients::{PageCapture, SiteBuilder};
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// How long the page gets to finish loading fonts and images
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

pub struct CaptureSocialImageStep {
    capture: Arc<dyn PageCapture>,
    site: SiteBuilder,
    page: PathBuf,
    output: PathBuf,
    settle: Duration,
}

impl CaptureSocialImageStep {
    pub fn new(
        capture: Arc<dyn PageCapture>,
        site: SiteBuilder,
        page: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            capture,
            site,
            page: page.into(),
            output: output.into(),
            settle: SETTLE_DELAY,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

#[async_trait]
impl Step for CaptureSocialImageStep {
    fn name(&self) -> &str {
        "capture social image"
    }

    fn kind(&self) -> StepKind {
        StepKind::Browser
    }

    async fn run(&self, _context: &WorkflowContext) -> Result<Fields, StepError> {
        let url = self.site.page_url(&self.page).await?;
        let png = self
            .capture
            .capture(&url, SOCIAL_WIDTH, SOCIAL_HEIGHT, self.settle)
            .await?;

        let path = self.site.write_file(&self.output, &png).await?;
        Ok(Fields::new().with("socialImagePath", path.display().to_string()))
    }
}

/// Recompresses the captured screenshot in place
pub struct CompressSocialImageStep;

#[async_trait]
impl Step for CompressSocialImageStep {
    fn name(&self) -> &str {
        "compress social image"
    }

    fn kind(&self) -> StepKind {
        StepKind::External
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let path = context.require_str("socialImagePath")?;
        let bytes = compress_social_image(Path::new(path)).await?;
        Ok(Fields::new().with("socialImageBytes", bytes))
    }
}
