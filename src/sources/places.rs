use crate::config::PlacesConfig;
use crate::error::{Result, TripgraphError};
use crate::sources::{Place, PlaceSearch};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Response structure from the Places text search API
#[derive(Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<Place>,
    #[serde(default)]
    status: Option<String>,
}

/// Google Places text search client
pub struct GooglePlaces {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GooglePlaces {
    pub fn new(api_key: String, config: &PlacesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Create a client reading the API key from `config.api_key_env`
    pub fn from_config(config: &PlacesConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TripgraphError::Config(format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable.",
                config.api_key_env
            ))
        })?;
        Self::new(api_key, config)
    }
}

#[async_trait]
impl PlaceSearch for GooglePlaces {
    async fn search(&self, query: &str, radius: u32) -> Result<Vec<Place>> {
        let radius = radius.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("query", query),
                ("radius", radius.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripgraphError::upstream("Place search", status, ""));
        }

        let body: TextSearchResponse = response.json().await?;
        if body.results.is_empty() {
            log::debug!(
                "Place search for {:?} returned no results (status {:?})",
                query,
                body.status
            );
        }
        Ok(body.results)
    }
}
