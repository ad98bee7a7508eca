//! Recommendation filter: graph context + user constraints -> kept places.

mod selection;

pub use selection::{parse_selection, Selection};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::graph::{build_context, ingest_destination, lock_graph, ExtractionOptions, SharedGraph};
use crate::services::Services;
use crate::sources::Place;

/// Trip constraints as submitted by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripRequest {
    pub destination: String,
    pub source: String,
    pub departure_date: String,
    pub return_date: String,
    pub budget: String,
    /// Free-text interests.
    pub description: String,
}

/// Knobs for a recommendation run.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub extraction: ExtractionOptions,
    pub max_depth: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            extraction: ExtractionOptions::default(),
            max_depth: 3,
        }
    }
}

impl From<&Config> for RecommendOptions {
    fn from(config: &Config) -> Self {
        Self {
            extraction: ExtractionOptions::from(&config.places),
            max_depth: config.graph.max_depth,
        }
    }
}

/// A place the filter kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub selected: bool,
}

/// Filter output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Recommendation {
    /// Records whose name the filter kept, in search order.
    Selected(Vec<SelectedPlace>),
    /// Every candidate name, returned when the generation call itself failed.
    Unfiltered(Vec<String>),
}

impl Recommendation {
    pub fn len(&self) -> usize {
        match self {
            Recommendation::Selected(places) => places.len(),
            Recommendation::Unfiltered(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const TRAVEL_EXPERT_PREAMBLE: &str = "You are a travel expert and your task is to recommend specific places based on the user's destination, budget, and interests.";

/// Prompt asking the generator for the exact names of places worth keeping.
pub fn build_recommendation_prompt(request: &TripRequest, names: &[String], context: &[String]) -> String {
    let names_json = serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string());

    format!(
        "{TRAVEL_EXPERT_PREAMBLE}\n\
         You are given a list of places and related details extracted from a Knowledge Graph.\n\
         Filter the relevant places from the data and return a JSON list containing only the exact names of the places, \
         ensuring that the recommendations align with the user's preferences.\n\n\
         USER Data:\n\
         Total list of places: {names_json}\n\
         Source information: {}\n\
         Destination: {}\n\
         Departure Date: {}\n\
         Return Date: {}\n\
         Budget: {}\n\
         Description of the user's interests: {}\n\n\
         Knowledge Graph Data:\n{}\n",
        request.source,
        request.destination,
        request.departure_date,
        request.return_date,
        request.budget,
        request.description,
        context.join("\n"),
    )
}

/// Keep the records whose quote-stripped `name` is in `chosen`, flagged as
/// selected. Names are compared in the same form the generator was shown.
pub fn mark_selected(places: &[Place], chosen: &[String]) -> Vec<SelectedPlace> {
    let chosen: HashSet<&str> = chosen.iter().map(String::as_str).collect();
    places
        .iter()
        .filter(|place| chosen.contains(place.name.replace('"', "").as_str()))
        .map(|place| SelectedPlace {
            place: place.clone(),
            selected: true,
        })
        .collect()
}

/// Recommend places for `request`.
///
/// Ingests the destination first when it is not in `known`; ingestion and
/// place search failures propagate. Everything after that fails open: an
/// unparsable answer keeps every candidate, and a failed generation call
/// returns the unfiltered name list.
pub async fn recommend_places(
    request: &TripRequest,
    known: &HashSet<String>,
    graph: &SharedGraph,
    services: Services<'_>,
    options: &RecommendOptions,
) -> Result<Recommendation> {
    if known.contains(&request.destination) {
        log::info!("Destination {} already exists in the graph", request.destination);
    } else {
        ingest_destination(&request.destination, graph, services, &options.extraction).await?;
        log::info!("Destination {} ingested", request.destination);
    }

    let query = format!("{}{}", options.extraction.query_prefix, request.destination);
    let places = services.places.search(&query, options.extraction.radius).await?;
    let names: Vec<String> = places.iter().map(|p| p.name.replace('"', "")).collect();

    let context = {
        let store = lock_graph(graph)?;
        build_context(&**store, &names, options.max_depth)
    };
    log::debug!("Built {} context lines for {} places", context.len(), names.len());

    let prompt = build_recommendation_prompt(request, &names, &context);
    let response = match services.generator.generate(&prompt).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Error calling generation API: {}", e);
            return Ok(Recommendation::Unfiltered(names));
        }
    };

    let chosen = parse_selection(&response).resolve(&names);
    let selected = mark_selected(&places, &chosen);
    log::info!("Kept {} of {} places", selected.len(), places.len());

    Ok(Recommendation::Selected(selected))
}
