//! Mock collaborators for unit tests, answering with preconfigured responses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Result, TripgraphError};
use crate::llm::TextGenerator;
use crate::services::ServiceSet;
use crate::sources::{Encyclopedia, Place, PlaceSearch, NO_INFORMATION};

/// Generator that replays queued responses and records every prompt.
///
/// When the queue is empty it answers with the fallback response, or fails
/// if none was set.
#[derive(Default)]
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn then_ok(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn then_err(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TripgraphError::Generation(message.into())));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => Err(TripgraphError::Generation("no mock response queued".to_string())),
        }
    }
}

/// Place search returning the same results for every query, or failing.
pub struct MockPlaces {
    results: Vec<Place>,
    fail_status: Option<u16>,
    queries: Mutex<Vec<String>>,
}

impl MockPlaces {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            results: names.iter().map(|n| Place::named(*n)).collect(),
            fail_status: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_places(results: Vec<Place>) -> Self {
        Self {
            results,
            fail_status: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            results: Vec::new(),
            fail_status: Some(status),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearch for MockPlaces {
    async fn search(&self, query: &str, _radius: u32) -> Result<Vec<Place>> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(status) = self.fail_status {
            return Err(TripgraphError::Upstream {
                service: "Place search".to_string(),
                status,
                reason: "mock failure".to_string(),
            });
        }
        Ok(self.results.clone())
    }
}

/// Encyclopedia answering from a fixed table.
#[derive(Default)]
pub struct MockEncyclopedia {
    articles: HashMap<String, String>,
    fail: bool,
    lookups: Mutex<Vec<String>>,
}

impl MockEncyclopedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(mut self, term: &str, text: &str) -> Self {
        self.articles.insert(term.to_string(), text.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encyclopedia for MockEncyclopedia {
    async fn search_and_fetch(&self, term: &str) -> Result<String> {
        self.lookups.lock().unwrap().push(term.to_string());
        if self.fail {
            return Err(TripgraphError::Upstream {
                service: "Encyclopedia lookup".to_string(),
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }
        Ok(self
            .articles
            .get(term)
            .cloned()
            .unwrap_or_else(|| NO_INFORMATION.to_string()))
    }
}

/// Bundle mocks into a [`ServiceSet`], keeping handles for assertions.
pub fn service_set(
    places: Arc<MockPlaces>,
    encyclopedia: Arc<MockEncyclopedia>,
    generator: Arc<MockGenerator>,
) -> ServiceSet {
    ServiceSet {
        places,
        encyclopedia,
        generator,
    }
}
