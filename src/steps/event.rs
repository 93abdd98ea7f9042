//! Ticketing platform steps
//!
//! Two ways to get an event: create one from scratch, or duplicate the
//! template event (which keeps its ticket types and settings) and update the
//! copy. Either way the event is left unpublished.

use crate::clients::{ApiError, EventAttributes, EventRecord, TicketingPlatform};
use crate::core::template::render;
use crate::core::text::slugify;
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Build event attributes from the prompt answers and the mentor issue URL
pub fn event_attributes(context: &WorkflowContext, description_template: &str) -> Result<EventAttributes, StepError> {
    let name = context.require_str("eventName")?;
    let location_name = context.require_str("eventLocationName")?;
    let location = context.require_str("eventLocation")?;
    let date = context.require_str("eventDate")?;
    let time = context.require_str("eventTime")?;
    let mentor_url = context.require_str("mentorRegistrationUrl")?;

    let description = render(
        description_template,
        &json!({ "time": time, "mentorRegistrationUrl": mentor_url }),
    )?;

    Ok(EventAttributes {
        title: format!("{} @ {}", name, location_name),
        slug: slugify(name),
        description,
        start_date: date.to_string(),
        end_date: date.to_string(),
        location: location.to_string(),
        live: false,
    })
}

/// Create a new event
pub struct CreateEventStep {
    platform: Arc<dyn TicketingPlatform>,
    description_template: String,
}

impl CreateEventStep {
    pub fn new(platform: Arc<dyn TicketingPlatform>, description_template: impl Into<String>) -> Self {
        Self {
            platform,
            description_template: description_template.into(),
        }
    }
}

#[async_trait]
impl Step for CreateEventStep {
    fn name(&self) -> &str {
        "create event"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteWrite
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let attributes = event_attributes(context, &self.description_template)?;
        let event = self.platform.create_event(&attributes).await?;
        info!("Created event {} ({})", event.slug, event.id);

        Ok(Fields::new()
            .with("eventApiId", event.id)
            .with("eventAdminUrl", event.api_url.clone())
            .with("eventApiUrl", event.api_url)
            .with("eventUrl", self.platform.public_url(&event.slug))
            .with("eventSlug", event.slug)
            .with("eventTitle", attributes.title))
    }
}

/// Copy the template event
pub struct DuplicateEventStep {
    platform: Arc<dyn TicketingPlatform>,
    template_slug: String,
}

impl DuplicateEventStep {
    pub fn new(platform: Arc<dyn TicketingPlatform>, template_slug: impl Into<String>) -> Self {
        Self {
            platform,
            template_slug: template_slug.into(),
        }
    }
}

#[async_trait]
impl Step for DuplicateEventStep {
    fn name(&self) -> &str {
        "duplicate event"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteWrite
    }

    async fn run(&self, _context: &WorkflowContext) -> Result<Fields, StepError> {
        let copy = self.platform.duplicate_event(&self.template_slug).await?;
        info!("Duplicated '{}' as {} ({})", self.template_slug, copy.slug, copy.id);

        Ok(Fields::new()
            .with("eventApiId", copy.id)
            .with("eventApiUrl", copy.api_url))
    }
}

/// Rewrite the duplicated event with this meetup's details
///
/// The admin API addresses events by slug, so the rename moves the event:
/// later requests go to `eventAdminUrl`, not the copy's `eventApiUrl`.
pub struct UpdateEventStep {
    platform: Arc<dyn TicketingPlatform>,
    description_template: String,
}

impl UpdateEventStep {
    pub fn new(platform: Arc<dyn TicketingPlatform>, description_template: impl Into<String>) -> Self {
        Self {
            platform,
            description_template: description_template.into(),
        }
    }
}

#[async_trait]
impl Step for UpdateEventStep {
    fn name(&self) -> &str {
        "update event"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteWrite
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let event = EventRecord {
            id: context.require_str("eventApiId")?.to_string(),
            slug: context.get_str("eventSlug").unwrap_or_default().to_string(),
            api_url: context.require_str("eventApiUrl")?.to_string(),
        };
        let attributes = event_attributes(context, &self.description_template)?;

        let updated = self.platform.update_event(&event, &attributes).await?;
        info!("Updated event {} as {}", updated.id, updated.slug);

        Ok(Fields::new()
            .with("eventAdminUrl", updated.api_url)
            .with("eventUrl", self.platform.public_url(&updated.slug))
            .with("eventSlug", updated.slug)
            .with("eventTitle", attributes.title))
    }
}

/// Read the event's first release (ticket type)
pub struct ReadReleasesStep {
    platform: Arc<dyn TicketingPlatform>,
}

impl ReadReleasesStep {
    pub fn new(platform: Arc<dyn TicketingPlatform>) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Step for ReadReleasesStep {
    fn name(&self) -> &str {
        "read releases"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteRead
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let api_url = context.require_str("eventAdminUrl")?;
        let releases = self.platform.list_releases(api_url).await?;

        let first = releases.into_iter().next().ok_or(ApiError::Empty {
            service: "Tito",
            what: "releases",
        })?;

        Ok(Fields::new()
            .with("releaseId", first.id)
            .with("releaseTitle", first.title))
    }
}

/// Fetch an event's settings document
pub struct EventSettingsStep {
    platform: Arc<dyn TicketingPlatform>,
    slug: String,
}

impl EventSettingsStep {
    pub fn new(platform: Arc<dyn TicketingPlatform>, slug: impl Into<String>) -> Self {
        Self {
            platform,
            slug: slug.into(),
        }
    }
}

#[async_trait]
impl Step for EventSettingsStep {
    fn name(&self) -> &str {
        "fetch event settings"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteRead
    }

    async fn run(&self, _context: &WorkflowContext) -> Result<Fields, StepError> {
        let settings = self.platform.event_settings(&self.slug).await?;
        Ok(Fields::new()
            .with("eventSlug", self.slug.clone())
            .with("eventSettings", settings))
    }
}
