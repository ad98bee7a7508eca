use crate::config::GenerationConfig;
use crate::error::{Result, TripgraphError};
use crate::llm::{TextGenerator, NO_RESPONSE};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request structure for the Gemini generateContent API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

/// Response structure from the Gemini generateContent API
#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Text of the first part of the first candidate, if the response has one.
fn candidate_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

/// Gemini text generation client
///
/// One request per call: no retries, no streaming. The request timeout is
/// the only deadline.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    url: String,
    params: GenerationParams,
}

impl GeminiClient {
    /// Create a client with an explicit API key
    pub fn new(api_key: String, config: &GenerationConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(TripgraphError::Generation(
                "No Gemini API key provided".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            params: GenerationParams {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    /// Create a client reading the API key from `config.api_key_env`
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TripgraphError::Generation(format!(
                "No Gemini API key provided. Set the {} environment variable",
                config.api_key_env
            ))
        })?;
        Self::new(api_key, config)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.params.clone(),
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(TripgraphError::upstream("Gemini API", status, &body));
        }

        let result: GenerateResponse = response.json().await?;
        log::debug!("Gemini call took {:?}", start.elapsed());

        match candidate_text(result) {
            Some(text) => Ok(text),
            None => {
                log::warn!("Gemini response contained no candidate text");
                Ok(NO_RESPONSE.to_string())
            }
        }
    }
}
