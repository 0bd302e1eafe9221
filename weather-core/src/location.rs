use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinates};

/// Delivers a single location fix per request.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// Always reports the same coordinates, e.g. from the command line or config.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Used when no location source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable)
    }
}
