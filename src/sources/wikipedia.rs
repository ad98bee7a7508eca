use crate::cache::ExtractCache;
use crate::config::EncyclopediaConfig;
use crate::error::{Result, TripgraphError};
use crate::sources::{Encyclopedia, NO_INFORMATION};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

/// MediaWiki search + plain-text extract client
///
/// Extracts are optionally cached by search term, so repeated ingestion of
/// overlapping destinations does not refetch the same article.
pub struct Wikipedia {
    client: Client,
    endpoint: String,
    cache: Option<Arc<ExtractCache>>,
}

impl Wikipedia {
    pub fn new(config: &EncyclopediaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("tripgraph/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = if config.cache_capacity > 0 {
            Some(Arc::new(ExtractCache::new(config.cache_capacity)))
        } else {
            None
        };

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            cache,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self.client.get(&self.endpoint).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripgraphError::upstream("Encyclopedia lookup", status, ""));
        }

        Ok(response.json().await?)
    }

    async fn fetch(&self, term: &str) -> Result<String> {
        let search: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", term),
                ("format", "json"),
            ])
            .await?;

        let Some(hit) = search.query.search.into_iter().next() else {
            return Ok(NO_INFORMATION.to_string());
        };

        let content: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("titles", hit.title.as_str()),
                ("explaintext", "1"),
            ])
            .await?;

        Ok(first_extract(content))
    }
}

fn first_extract(content: ExtractResponse) -> String {
    content
        .query
        .pages
        .into_values()
        .find_map(|page| page.extract)
        .unwrap_or_else(|| NO_INFORMATION.to_string())
}

#[async_trait]
impl Encyclopedia for Wikipedia {
    async fn search_and_fetch(&self, term: &str) -> Result<String> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(term) {
                log::debug!("Extract cache hit for {}", term);
                return Ok(cached);
            }
        }

        let extract = self.fetch(term).await?;

        if let Some(cache) = &self.cache {
            cache.put(term.to_string(), extract.clone());
        }

        Ok(extract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parsing() {
        let search: SearchResponse = serde_json::from_str(
            r#"{"batchcomplete":"","query":{"searchinfo":{"totalhits":1},"search":[{"ns":0,"title":"Eiffel Tower","pageid":9232}]}}"#,
        )
        .unwrap();
        assert_eq!(search.query.search[0].title, "Eiffel Tower");
    }

    #[test]
    fn test_first_extract() {
        let content: ExtractResponse = serde_json::from_str(
            r#"{"query":{"pages":{"9232":{"pageid":9232,"title":"Eiffel Tower","extract":"The Eiffel Tower is a wrought-iron lattice tower."}}}}"#,
        )
        .unwrap();
        assert!(first_extract(content).starts_with("The Eiffel Tower"));
    }

    #[test]
    fn test_missing_extract_falls_back() {
        let content: ExtractResponse =
            serde_json::from_str(r#"{"query":{"pages":{"-1":{"missing":""}}}}"#).unwrap();
        assert_eq!(first_extract(content), NO_INFORMATION);
    }

    #[test]
    fn test_cache_disabled_at_zero_capacity() {
        let config = EncyclopediaConfig {
            cache_capacity: 0,
            ..EncyclopediaConfig::default()
        };
        let wiki = Wikipedia::new(&config).unwrap();
        assert!(wiki.cache.is_none());
    }
}
