//! Concrete workflow steps
//!
//! Each step reads its inputs from the context and talks to exactly one
//! collaborator. Collaborators are held as trait objects so tests can swap
//! in fakes.

pub mod calendar;
pub mod event;
pub mod geocode;
pub mod issue;
pub mod prompt;
pub mod site;
pub mod social;

pub use calendar::SubmitCalendarStep;
pub use event::{
    event_attributes, CreateEventStep, DuplicateEventStep, EventSettingsStep, ReadReleasesStep,
    UpdateEventStep,
};
pub use geocode::GeocodeStep;
pub use issue::CreateMentorIssueStep;
pub use prompt::{PromptSource, PromptStep, Question, ScriptedAnswers, TerminalPrompt, Validation};
pub use site::{RunCommandStep, WriteSiteDataStep};
pub use social::{CaptureSocialImageStep, CompressSocialImageStep, SETTLE_DELAY};
