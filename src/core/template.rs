//! Notification body templates
//!
//! Templates use `{{field}}` placeholders (Mustache/Handlebars syntax) and are
//! rendered without HTML escaping, since the output is Markdown or plain text.

use crate::core::config::{ConfigError, TemplateSettings};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Built-in body of the mentor registration issue
pub const MENTOR_ISSUE_TEMPLATE: &str = include_str!("../../templates/mentor-registration-issue.hbs");

/// Built-in description of the ticketed event
pub const EVENT_DESCRIPTION_TEMPLATE: &str = include_str!("../../templates/event-description.hbs");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to render template: {0}")]
    Render(String),
}

/// Render `template` against `fields`
///
/// Unknown placeholders render as empty strings.
pub fn render<T: Serialize>(template: &str, fields: &T) -> Result<String, TemplateError> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    registry
        .render_template(template, fields)
        .map_err(|e| TemplateError::Render(e.to_string()))
}

/// The notification templates a workflow renders
#[derive(Debug, Clone, PartialEq)]
pub struct Templates {
    pub mentor_issue: String,
    pub event_description: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            mentor_issue: MENTOR_ISSUE_TEMPLATE.to_string(),
            event_description: EVENT_DESCRIPTION_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    /// Built-in templates, replaced by any override files configured
    pub fn load(settings: &TemplateSettings) -> Result<Self, ConfigError> {
        let mut templates = Self::default();
        if let Some(path) = &settings.mentor_issue {
            templates.mentor_issue = read_template(path)?;
        }
        if let Some(path) = &settings.event_description {
            templates.event_description = read_template(path)?;
        }
        Ok(templates)
    }
}

fn read_template(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
