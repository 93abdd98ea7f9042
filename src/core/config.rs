//! Tool configuration: YAML settings plus credentials from the environment
//!
//! A `Config` is built once at start-up and handed by reference to whatever
//! builds the API clients. Nothing below `main` reads the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_GITHUB_USER: &str = "MEETUP_GITHUB_USER";
pub const ENV_GITHUB_TOKEN: &str = "MEETUP_GITHUB_TOKEN";
pub const ENV_TITO_API_KEY: &str = "MEETUP_TITO_API_KEY";
pub const ENV_MAPS_API_KEY: &str = "MEETUP_MAPS_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("environment variable {0} is not set")]
    MissingCredential(&'static str),
}

/// Issue tracker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: "Fauntleroy".to_string(),
            repo: "github-api-test-repo".to_string(),
        }
    }
}

/// Ticketing platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketingSettings {
    pub api_url: String,
    pub account: String,

    /// Base of public event pages
    pub public_url: String,

    /// Event to duplicate for each new meetup; `null` creates events from scratch
    pub template_event: Option<String>,
}

impl Default for TicketingSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.tito.io/v2".to_string(),
            account: "nodeschool-oakland".to_string(),
            public_url: "https://ti.to".to_string(),
            template_event: Some("october-2016-npm".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingSettings {
    pub api_url: String,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            api_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
        }
    }
}

/// WebDriver connection used for the calendar form and the social image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,

    /// Upper bound on waiting for an element to appear
    pub timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            timeout_secs: 30,
        }
    }
}

/// External community calendar submission form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSettings {
    pub form_url: String,
    #[serde(default)]
    pub selectors: CalendarSelectors,
}

/// CSS selectors for the calendar form controls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSelectors {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub url: String,
    pub submit: String,
    pub confirmation_link: String,
}

impl Default for CalendarSelectors {
    fn default() -> Self {
        Self {
            title: "input[name='title']".to_string(),
            date: "input[name='date']".to_string(),
            time: "input[name='time']".to_string(),
            location: "input[name='location']".to_string(),
            url: "input[name='url']".to_string(),
            submit: "button[type='submit']".to_string(),
            confirmation_link: "a.confirmation".to_string(),
        }
    }
}

/// Static site generation and publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Directory commands run in; other paths are relative to it
    pub root: PathBuf,
    pub data_file: PathBuf,
    pub build_command: Vec<String>,
    pub publish_command: Vec<String>,
    pub social_page: PathBuf,
    pub social_image: PathBuf,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_file: PathBuf::from("docs/data/event.json"),
            build_command: vec!["npm".to_string(), "run".to_string(), "build".to_string()],
            publish_command: vec!["npm".to_string(), "run".to_string(), "publish-site".to_string()],
            social_page: PathBuf::from("docs/social.html"),
            social_image: PathBuf::from("docs/images/social.png"),
        }
    }
}

/// Defaults offered at the event prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptDefaults {
    pub location_name: String,
    pub location: String,
    pub time: String,
}

impl Default for PromptDefaults {
    fn default() -> Self {
        Self {
            location_name: "npm".to_string(),
            location: "1999 Harrison St. Ste. 1150 Oakland, CA 94612".to_string(),
            time: "1-5PM".to_string(),
        }
    }
}

/// Optional template overrides; built-in templates are used when unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    pub mentor_issue: Option<PathBuf>,
    pub event_description: Option<PathBuf>,
}

/// Top-level settings loaded from YAML; every section has defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub github: GitHubSettings,
    pub ticketing: TicketingSettings,
    pub geocoding: GeocodingSettings,
    pub browser: BrowserSettings,
    pub calendar: Option<CalendarSettings>,
    pub site: SiteSettings,
    pub prompts: PromptDefaults,
    pub templates: TemplateSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
            ("ticketing.account", &self.ticketing.account),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }

        if let Some(template) = &self.ticketing.template_event {
            if template.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "ticketing.template_event must not be empty (use null to create events)".to_string(),
                ));
            }
        }

        for (name, command) in [
            ("site.build_command", &self.site.build_command),
            ("site.publish_command", &self.site.publish_command),
        ] {
            if command.is_empty() || command[0].trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must name a program", name)));
            }
        }

        if let Some(calendar) = &self.calendar {
            if calendar.form_url.trim().is_empty() {
                return Err(ConfigError::Invalid("calendar.form_url must not be empty".to_string()));
            }
        }

        if self.browser.timeout_secs == 0 {
            return Err(ConfigError::Invalid("browser.timeout_secs must be positive".to_string()));
        }

        Ok(())
    }
}

/// API credentials, read once from the environment
#[derive(Clone, Default)]
pub struct Credentials {
    pub github_user: Option<String>,
    pub github_token: Option<String>,
    pub tito_api_key: Option<String>,
    pub maps_api_key: Option<String>,
}

impl Credentials {
    /// Read credentials from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            github_user: read(ENV_GITHUB_USER),
            github_token: read(ENV_GITHUB_TOKEN),
            tito_api_key: read(ENV_TITO_API_KEY),
            maps_api_key: read(ENV_MAPS_API_KEY),
        }
    }

    pub fn github_user(&self) -> Result<&str, ConfigError> {
        Self::require(&self.github_user, ENV_GITHUB_USER)
    }

    pub fn github_token(&self) -> Result<&str, ConfigError> {
        Self::require(&self.github_token, ENV_GITHUB_TOKEN)
    }

    pub fn tito_api_key(&self) -> Result<&str, ConfigError> {
        Self::require(&self.tito_api_key, ENV_TITO_API_KEY)
    }

    pub fn maps_api_key(&self) -> Result<&str, ConfigError> {
        Self::require(&self.maps_api_key, ENV_MAPS_API_KEY)
    }

    fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
        value.as_deref().ok_or(ConfigError::MissingCredential(name))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "[REDACTED]" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("github_user", &self.github_user)
            .field("github_token", &mask(&self.github_token))
            .field("tito_api_key", &mask(&self.tito_api_key))
            .field("maps_api_key", &mask(&self.maps_api_key))
            .finish()
    }
}

/// Everything the tool needs to know before running a workflow
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub credentials: Credentials,
}

impl Config {
    pub fn new(settings: Settings, credentials: Credentials) -> Self {
        Self { settings, credentials }
    }

    /// Load settings from `path` (or the default location when it exists) and
    /// credentials from the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Settings::from_file(path)?,
            None => match default_settings_path() {
                Some(default) if default.exists() => Settings::from_file(default)?,
                _ => Settings::default(),
            },
        };

        Ok(Self::new(settings, Credentials::from_env()))
    }
}

/// `~/.config/meetup-ops/config.yaml` (platform equivalent)
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("meetup-ops").join("config.yaml"))
}
