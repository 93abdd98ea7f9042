//! Shared plumbing for the JSON HTTP APIs

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Error types for remote API calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unexpected body: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} rejected the request: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },

    #[error("{service} returned no {what}")]
    Empty {
        service: &'static str,
        what: &'static str,
    },
}

impl ApiError {
    pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> ApiError {
        move |source| ApiError::Transport { service, source }
    }
}

/// Check the status of `response` and decode its JSON body
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(ApiError::transport(service))?;

    if !status.is_success() {
        warn!("{} returned {}: {}", service, status.as_u16(), body.trim());
        return Err(ApiError::Status {
            service,
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }

    debug!("{} returned {} bytes", service, body.len());
    serde_json::from_str(&body).map_err(|e| ApiError::Decode {
        service,
        message: e.to_string(),
    })
}
