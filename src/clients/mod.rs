//! Clients for the external collaborators: issue tracker, ticketing platform,
//! geocoder, browser, static site tooling and image recompression

pub mod browser;
pub mod canvas;
pub mod geocode;
pub mod github;
pub mod http;
pub mod site;
pub mod tito;

pub use browser::{BrowserError, CalendarEntry, CalendarForm, PageCapture, WebDriverBrowser, WebDriverCalendarForm};
pub use canvas::CanvasError;
pub use geocode::{Coordinates, Geocoder, GoogleGeocoder, DEFAULT_COORDINATES};
pub use github::{CreatedIssue, GitHubClient, IssueTracker, NewIssue};
pub use http::ApiError;
pub use site::{SiteBuilder, SiteError};
pub use tito::{EventAttributes, EventRecord, Release, TicketingPlatform, TitoClient};
