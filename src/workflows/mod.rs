//! The runnable workflows, assembled from configuration
//!
//! Clients are built here, so a missing credential fails before the first
//! step runs.

use crate::clients::{
    CalendarForm, Geocoder, GitHubClient, GoogleGeocoder, IssueTracker, PageCapture, SiteBuilder,
    TicketingPlatform, TitoClient, WebDriverBrowser, WebDriverCalendarForm,
};
use crate::core::config::{Config, ConfigError, PromptDefaults};
use crate::core::template::Templates;
use crate::core::Workflow;
use crate::steps::{
    CaptureSocialImageStep, CompressSocialImageStep, CreateEventStep, CreateMentorIssueStep,
    DuplicateEventStep, EventSettingsStep, GeocodeStep, PromptSource, PromptStep, Question,
    ReadReleasesStep, RunCommandStep, SubmitCalendarStep, TerminalPrompt, UpdateEventStep,
    Validation, WriteSiteDataStep,
};
use std::sync::Arc;

pub const CREATE_EVENT: &str = "create-event";
pub const EVENT_SETTINGS: &str = "event-settings";
pub const SOCIAL_IMAGE: &str = "social-image";

/// External services the create workflow talks to
#[derive(Clone)]
pub struct Collaborators {
    pub prompts: Arc<dyn PromptSource>,
    pub issues: Arc<dyn IssueTracker>,
    pub ticketing: Arc<dyn TicketingPlatform>,
    pub geocoder: Arc<dyn Geocoder>,
    /// Absent when no calendar form is configured
    pub calendar: Option<Arc<dyn CalendarForm>>,
}

impl Collaborators {
    /// Real clients for every service, prompting on the terminal
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let calendar = config.settings.calendar.as_ref().map(|settings| {
            let browser = WebDriverBrowser::new(&config.settings.browser);
            Arc::new(WebDriverCalendarForm::new(browser, settings.clone())) as Arc<dyn CalendarForm>
        });

        Ok(Self {
            prompts: Arc::new(TerminalPrompt::new()),
            issues: Arc::new(GitHubClient::from_config(config)?),
            ticketing: Arc::new(TitoClient::from_config(config)?),
            geocoder: Arc::new(GoogleGeocoder::from_config(config)?),
            calendar,
        })
    }
}

/// Questions asked at the start of the create workflow
pub fn event_questions(defaults: &PromptDefaults) -> Vec<Question> {
    let required = |message: &str| Validation::Required(message.to_string());
    vec![
        Question::new(
            "eventName",
            "What is the name of the event?",
            required("You must input a name for the event!"),
        ),
        Question::new(
            "eventLocationName",
            "What is the name of the location of the event?",
            required("You must input a location name for the event!"),
        )
        .with_default(defaults.location_name.clone()),
        Question::new(
            "eventLocation",
            "Where will the event be located?",
            required("You must input a location for the event!"),
        )
        .with_default(defaults.location.clone()),
        Question::new(
            "eventDate",
            "What date will the event be on? (MM/DD/YY)",
            Validation::Date("You must input a date for the event!".to_string()),
        ),
        Question::new(
            "eventTime",
            "What time will the event start?",
            required("You must input a time for the event!"),
        )
        .with_default(defaults.time.clone()),
    ]
}

/// Prompt, geocode, mentor issue, ticketed event, calendar, site build and publish
pub fn create_event(config: &Config, collaborators: &Collaborators) -> Result<Workflow, ConfigError> {
    let settings = &config.settings;
    let templates = Templates::load(&settings.templates)?;
    let site = SiteBuilder::new(&settings.site.root);
    let ticketing = collaborators.ticketing.clone();

    let mut workflow = Workflow::new(CREATE_EVENT)
        .step(PromptStep::new(
            "collect event details",
            event_questions(&settings.prompts),
            collaborators.prompts.clone(),
        ))
        .step(GeocodeStep::new(collaborators.geocoder.clone()))
        .step(CreateMentorIssueStep::new(
            collaborators.issues.clone(),
            templates.mentor_issue,
        ));

    workflow = match &settings.ticketing.template_event {
        Some(template) => workflow
            .step(DuplicateEventStep::new(ticketing.clone(), template.clone()))
            .step(UpdateEventStep::new(
                ticketing.clone(),
                templates.event_description,
            )),
        None => workflow.step(CreateEventStep::new(
            ticketing.clone(),
            templates.event_description,
        )),
    };

    workflow = workflow.step(ReadReleasesStep::new(ticketing));

    if let Some(form) = &collaborators.calendar {
        workflow = workflow.step(SubmitCalendarStep::new(form.clone()));
    }

    Ok(workflow
        .step(WriteSiteDataStep::new(site.clone(), settings.site.data_file.clone()))
        .step(RunCommandStep::new(
            "build site",
            site.clone(),
            settings.site.build_command.clone(),
        ))
        .step(RunCommandStep::new(
            "publish site",
            site,
            settings.site.publish_command.clone(),
        )))
}

/// Fetch the template event's settings document
pub fn event_settings(
    config: &Config,
    ticketing: Arc<dyn TicketingPlatform>,
) -> Result<Workflow, ConfigError> {
    let slug = config
        .settings
        .ticketing
        .template_event
        .clone()
        .ok_or_else(|| ConfigError::Invalid("ticketing.template_event is not set".to_string()))?;

    Ok(Workflow::new(EVENT_SETTINGS).step(EventSettingsStep::new(ticketing, slug)))
}

/// Screenshot the social preview page and fit it to the social canvas
pub fn social_image(config: &Config, capture: Arc<dyn PageCapture>) -> Workflow {
    let site = &config.settings.site;
    Workflow::new(SOCIAL_IMAGE)
        .step(CaptureSocialImageStep::new(
            capture,
            SiteBuilder::new(&site.root),
            site.social_page.clone(),
            site.social_image.clone(),
        ))
        .step(CompressSocialImageStep)
}
