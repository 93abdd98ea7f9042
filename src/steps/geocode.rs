//! Venue geocoding step

use crate::clients::{Geocoder, DEFAULT_COORDINATES};
use crate::core::{Fields, Step, StepError, StepKind, WorkflowContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves `eventLocation` to `eventCoordinates`
///
/// An address the geocoder has no match for falls back to
/// [`DEFAULT_COORDINATES`]; a failed request is still a step failure.
pub struct GeocodeStep {
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodeStep {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl Step for GeocodeStep {
    fn name(&self) -> &str {
        "geocode venue"
    }

    fn kind(&self) -> StepKind {
        StepKind::RemoteRead
    }

    async fn run(&self, context: &WorkflowContext) -> Result<Fields, StepError> {
        let address = context.require_str("eventLocation")?;

        let coordinates = match self.geocoder.geocode(address).await? {
            Some(found) => {
                debug!("'{}' is at {}, {}", address, found.lat, found.lng);
                found
            }
            None => {
                warn!("No geocoding result for '{}', using default venue", address);
                DEFAULT_COORDINATES
            }
        };

        let value = serde_json::to_value(coordinates)
            .map_err(|e| StepError::Failed(format!("could not encode coordinates: {}", e)))?;
        Ok(Fields::new().with("eventCoordinates", value))
    }
}
