//! External collaborators used by the ingestion and recommendation flows.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::llm::{GeminiClient, TextGenerator};
use crate::sources::{Encyclopedia, GooglePlaces, PlaceSearch, Wikipedia};

/// Borrowed view over the three black-box services a flow calls.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub places: &'a dyn PlaceSearch,
    pub encyclopedia: &'a dyn Encyclopedia,
    pub generator: &'a dyn TextGenerator,
}

/// Owned, shareable set of services, as held by the HTTP layer and binaries.
#[derive(Clone)]
pub struct ServiceSet {
    pub places: Arc<dyn PlaceSearch>,
    pub encyclopedia: Arc<dyn Encyclopedia>,
    pub generator: Arc<dyn TextGenerator>,
}

impl ServiceSet {
    /// Build the HTTP-backed clients. Fails if an API key variable is unset.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            places: Arc::new(GooglePlaces::from_config(&config.places)?),
            encyclopedia: Arc::new(Wikipedia::new(&config.encyclopedia)?),
            generator: Arc::new(GeminiClient::from_config(&config.generation)?),
        })
    }

    pub fn borrow(&self) -> Services<'_> {
        Services {
            places: self.places.as_ref(),
            encyclopedia: self.encyclopedia.as_ref(),
            generator: self.generator.as_ref(),
        }
    }
}
