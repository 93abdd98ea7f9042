//! Browser automation over WebDriver
//!
//! Two jobs need a real browser: submitting the community calendar form and
//! screenshotting the social preview page. Both open a fresh session, do their
//! work and close the session whether or not the work succeeded.

use crate::core::config::{BrowserSettings, CalendarSettings};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("could not start a browser session at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("element '{selector}' not found: {message}")]
    ElementNotFound { selector: String, message: String },

    #[error("timed out after {secs}s waiting for '{selector}'")]
    Timeout { selector: String, secs: u64 },

    #[error("'{selector}' has no link target")]
    MissingLink { selector: String },

    #[error("browser command failed: {0}")]
    Command(String),
}

/// What gets entered into the calendar form
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub url: String,
}

#[async_trait]
pub trait CalendarForm: Send + Sync {
    /// Fill and submit the form, returning the confirmation link
    async fn submit(&self, entry: &CalendarEntry) -> Result<String, BrowserError>;
}

#[async_trait]
pub trait PageCapture: Send + Sync {
    /// Render `page_url` in a `width`×`height` viewport and screenshot it as PNG
    async fn capture(
        &self,
        page_url: &str,
        width: u32,
        height: u32,
        settle: Duration,
    ) -> Result<Vec<u8>, BrowserError>;
}

/// Connection details for a WebDriver server (chromedriver, geckodriver, ...)
#[derive(Debug, Clone)]
pub struct WebDriverBrowser {
    webdriver_url: String,
    timeout: Duration,
}

impl WebDriverBrowser {
    pub fn new(settings: &BrowserSettings) -> Self {
        Self {
            webdriver_url: settings.webdriver_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    async fn connect(&self) -> Result<Client, BrowserError> {
        debug!("Opening WebDriver session at {}", self.webdriver_url);
        ClientBuilder::native()
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| BrowserError::Connect {
                url: self.webdriver_url.clone(),
                message: e.to_string(),
            })
    }

    async fn close(client: Client) {
        if let Err(e) = client.close().await {
            warn!("Failed to close browser session: {}", e);
        }
    }

    async fn goto(client: &Client, url: &str) -> Result<(), BrowserError> {
        client.goto(url).await.map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn fill(client: &Client, selector: &str, value: &str) -> Result<(), BrowserError> {
        let element = client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| not_found(selector, e))?;
        element
            .send_keys(value)
            .await
            .map_err(|e| BrowserError::Command(e.to_string()))
    }
}

/// `[innerWidth, innerHeight]` as returned by the page
fn viewport_size(value: &Value) -> Option<(u32, u32)> {
    let pair = value.as_array()?;
    let width = u32::try_from(pair.first()?.as_u64()?).ok()?;
    let height = u32::try_from(pair.get(1)?.as_u64()?).ok()?;
    Some((width, height))
}

/// Window size whose viewport is `target`, given the viewport measured at `window`
fn window_for_viewport(window: (u32, u32), viewport: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        (window.0 + target.0).saturating_sub(viewport.0),
        (window.1 + target.1).saturating_sub(viewport.1),
    )
}

fn not_found(selector: &str, error: fantoccini::error::CmdError) -> BrowserError {
    BrowserError::ElementNotFound {
        selector: selector.to_string(),
        message: error.to_string(),
    }
}

/// Calendar form driven through WebDriver
#[derive(Debug, Clone)]
pub struct WebDriverCalendarForm {
    browser: WebDriverBrowser,
    settings: CalendarSettings,
}

impl WebDriverCalendarForm {
    pub fn new(browser: WebDriverBrowser, settings: CalendarSettings) -> Self {
        Self { browser, settings }
    }

    async fn fill_and_submit(&self, client: &Client, entry: &CalendarEntry) -> Result<String, BrowserError> {
        let selectors = &self.settings.selectors;

        WebDriverBrowser::goto(client, &self.settings.form_url).await?;

        for (selector, value) in [
            (&selectors.title, &entry.title),
            (&selectors.date, &entry.date),
            (&selectors.time, &entry.time),
            (&selectors.location, &entry.location),
            (&selectors.url, &entry.url),
        ] {
            WebDriverBrowser::fill(client, selector, value).await?;
        }

        client
            .find(Locator::Css(&selectors.submit))
            .await
            .map_err(|e| not_found(&selectors.submit, e))?
            .click()
            .await
            .map_err(|e| BrowserError::Command(e.to_string()))?;

        let link = client
            .wait()
            .at_most(self.browser.timeout)
            .for_element(Locator::Css(&selectors.confirmation_link))
            .await
            .map_err(|_| BrowserError::Timeout {
                selector: selectors.confirmation_link.clone(),
                secs: self.browser.timeout.as_secs(),
            })?;

        link.attr("href")
            .await
            .map_err(|e| BrowserError::Command(e.to_string()))?
            .filter(|href| !href.trim().is_empty())
            .ok_or_else(|| BrowserError::MissingLink {
                selector: selectors.confirmation_link.clone(),
            })
    }
}

#[async_trait]
impl CalendarForm for WebDriverCalendarForm {
    async fn submit(&self, entry: &CalendarEntry) -> Result<String, BrowserError> {
        info!("Submitting '{}' to {}", entry.title, self.settings.form_url);

        let client = self.browser.connect().await?;
        let result = self.fill_and_submit(&client, entry).await;
        WebDriverBrowser::close(client).await;

        result
    }
}

#[async_trait]
impl PageCapture for WebDriverBrowser {
    async fn capture(
        &self,
        page_url: &str,
        width: u32,
        height: u32,
        settle: Duration,
    ) -> Result<Vec<u8>, BrowserError> {
        info!("Capturing {} at {}x{}", page_url, width, height);

        let client = self.connect().await?;
        let result = async {
            let command = |e: fantoccini::error::CmdError| BrowserError::Command(e.to_string());

            // The window includes browser chrome; grow it until the viewport matches
            client.set_window_size(width, height).await.map_err(command)?;
            Self::goto(&client, page_url).await?;

            let measured = client
                .execute("return [window.innerWidth, window.innerHeight];", Vec::new())
                .await
                .map_err(command)?;
            let viewport = viewport_size(&measured)
                .ok_or_else(|| BrowserError::Command(format!("unexpected viewport size {}", measured)))?;
            if viewport != (width, height) {
                let (window_width, window_height) = window_for_viewport((width, height), viewport, (width, height));
                debug!("Viewport is {}x{}, resizing window to {}x{}", viewport.0, viewport.1, window_width, window_height);
                client
                    .set_window_size(window_width, window_height)
                    .await
                    .map_err(command)?;
            }

            tokio::time::sleep(settle).await;
            client
                .screenshot()
                .await
                .map_err(|e| BrowserError::Command(e.to_string()))
        }
        .await;
        Self::close(client).await;

        result
    }
}
