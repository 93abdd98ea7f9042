//! Ticketing platform client (Tito admin API, JSON:API documents)

use crate::clients::http::{read_json, ApiError};
use crate::core::config::{Config, ConfigError, TicketingSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

const SERVICE: &str = "Tito";
const JSON_API: &str = "application/vnd.api+json";

/// Attributes written when creating or updating an event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventAttributes {
    pub title: String,
    pub slug: String,
    pub description: String,
    /// ISO date (`YYYY-MM-DD`)
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub live: bool,
}

/// An event as identified by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub slug: String,
    /// Admin API URL of the event
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub id: String,
    pub title: String,
}

#[async_trait]
pub trait TicketingPlatform: Send + Sync {
    async fn create_event(&self, attributes: &EventAttributes) -> Result<EventRecord, ApiError>;

    /// Copy an existing event; the copy keeps the template's settings
    async fn duplicate_event(&self, template_slug: &str) -> Result<EventRecord, ApiError>;

    async fn update_event(
        &self,
        event: &EventRecord,
        attributes: &EventAttributes,
    ) -> Result<EventRecord, ApiError>;

    async fn list_releases(&self, event_api_url: &str) -> Result<Vec<Release>, ApiError>;

    /// Raw `event_settings` document of an event
    async fn event_settings(&self, slug: &str) -> Result<Value, ApiError>;

    /// Public page of an event
    fn public_url(&self, slug: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct Document<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: Value,
    #[serde(default)]
    attributes: Value,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Links {
    #[serde(rename = "self")]
    self_link: Option<String>,
}

impl Resource {
    fn id(&self) -> Result<String, ApiError> {
        match &self.id {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(ApiError::Decode {
                service: SERVICE,
                message: "resource has no id".to_string(),
            }),
        }
    }

    fn attribute(&self, name: &str) -> Result<String, ApiError> {
        self.attributes
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode {
                service: SERVICE,
                message: format!("resource has no '{}' attribute", name),
            })
    }
}

/// Tito client bound to one account
#[derive(Clone)]
pub struct TitoClient {
    http: reqwest::Client,
    base_url: String,
    public_base: String,
    api_key: String,
}

impl TitoClient {
    pub fn new(settings: &TicketingSettings, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/{}", settings.api_url.trim_end_matches('/'), settings.account),
            public_base: format!("{}/{}", settings.public_url.trim_end_matches('/'), settings.account),
            api_key: api_key.into(),
        }
    }

    /// Build the client, failing if its credentials are not configured
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config.settings.ticketing,
            config.credentials.tito_api_key()?,
        ))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Token token={}", self.api_key))
            .header("Accept", JSON_API)
    }

    fn record(&self, resource: Resource) -> Result<EventRecord, ApiError> {
        let id = resource.id()?;
        let slug = resource.attribute("slug")?;
        let api_url = resource
            .links
            .as_ref()
            .and_then(|l| l.self_link.clone())
            .unwrap_or_else(|| format!("{}/{}", self.base_url, slug));
        Ok(EventRecord { id, slug, api_url })
    }
}

#[async_trait]
impl TicketingPlatform for TitoClient {
    async fn create_event(&self, attributes: &EventAttributes) -> Result<EventRecord, ApiError> {
        info!("Creating event '{}'", attributes.title);
        let body = json!({ "data": { "type": "events", "attributes": attributes } });

        let response = self
            .authorized(self.http.post(format!("{}/events", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let doc: Document<Resource> = read_json(SERVICE, response).await?;
        self.record(doc.data)
    }

    async fn duplicate_event(&self, template_slug: &str) -> Result<EventRecord, ApiError> {
        info!("Duplicating event '{}'", template_slug);

        let response = self
            .authorized(
                self.http
                    .post(format!("{}/{}/duplication", self.base_url, template_slug)),
            )
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let doc: Document<Resource> = read_json(SERVICE, response).await?;
        self.record(doc.data)
    }

    async fn update_event(
        &self,
        event: &EventRecord,
        attributes: &EventAttributes,
    ) -> Result<EventRecord, ApiError> {
        info!("Updating event {} ({})", event.id, attributes.title);
        let body = json!({
            "data": { "type": "events", "id": event.id, "attributes": attributes }
        });

        let response = self
            .authorized(self.http.patch(&event.api_url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let doc: Document<Resource> = read_json(SERVICE, response).await?;
        self.record(doc.data)
    }

    async fn list_releases(&self, event_api_url: &str) -> Result<Vec<Release>, ApiError> {
        let url = format!("{}/releases", event_api_url.trim_end_matches('/'));

        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        let doc: Document<Vec<Resource>> = read_json(SERVICE, response).await?;
        doc.data
            .iter()
            .map(|r| -> Result<Release, ApiError> {
                Ok(Release {
                    id: r.id()?,
                    title: r.attribute("title").unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn event_settings(&self, slug: &str) -> Result<Value, ApiError> {
        let response = self
            .authorized(
                self.http
                    .get(format!("{}/{}/event_settings", self.base_url, slug)),
            )
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }

    fn public_url(&self, slug: &str) -> String {
        format!("{}/{}", self.public_base, slug)
    }
}

impl std::fmt::Debug for TitoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitoClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
