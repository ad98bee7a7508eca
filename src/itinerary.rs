//! Itinerary synthesis: chosen places + preferences -> ordered schedule.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TripgraphError};
use crate::llm::{fenced_block, TextGenerator};

const EVENT_PLANNER_PREAMBLE: &str =
    "You are an event planner and your task is to plan a series of events for a group of tourists.";

const SCHEDULE_SHAPE: &str = r#"[
  {
    "place_id": 0,
    "name": "Burj Khalifa",
    "details": "The Burj Khalifa is the tallest building in the world and a major attraction. Start your day early to avoid long queues for the observation deck.",
    "timing": "9:00 AM to 10:30 AM",
    "Famous Activity": "Photoshoots",
    "total_duration": "1-2 hours",
    "recommended_transport": "Taxi",
    "additional_notes": "Grab a pair of glasses and a camera. Dress nicely and bring water."
  },
  ...
  {
    "place_id": 4,
    "name": "Downtown Dubai Park",
    "details": "Visit another park or green space to enjoy the peaceful environment.",
    "timing": "1:00 PM to 4:45 PM",
    "Famous Activity": "Swimming",
    "total_duration": "4-5 hours",
    "recommended_transport": "Walking",
    "additional_notes": "Grab a snack or lunch at Dubai Mall or nearby cafes. Dress comfortably and bring water, especially for outdoor activities."
  }
]"#;

/// One scheduled stop. Generation output only loosely follows the shape, so
/// every field is optional and unknown fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryEntry {
    pub place_id: Value,
    pub name: String,
    pub details: String,
    pub timing: String,
    #[serde(rename = "Famous Activity")]
    pub famous_activity: String,
    pub total_duration: String,
    pub recommended_transport: String,
    pub additional_notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn build_itinerary_prompt(chosen: &str, preferences: &str) -> String {
    format!(
        "{EVENT_PLANNER_PREAMBLE}\n\n\
         {preferences}Plan a series of events that will provide a memorable experience for the group. \
         The group is interested in exploring the places listed below.\n \
         Selected Places:{chosen}\n\
         Return a smart plan in the form of a 'JSON list of the same structure' containing the events and \
         activities that the group should participate in. Ensure that the plan includes the total number of \
         places to visit, the locations, details, timings, famous activities, total duration, recommended \
         transport, and additional notes.{SCHEDULE_SHAPE}"
    )
}

/// Read the schedule out of the first fenced block of `response`.
///
/// There is no fallback: a response without a fence, with invalid JSON in it,
/// or with JSON that is not an array of entries is a [`TripgraphError::Parse`].
pub fn parse_schedule(response: &str) -> Result<Vec<ItineraryEntry>> {
    let block = fenced_block(response, "json").ok_or_else(|| {
        TripgraphError::Parse("Itinerary response contains no fenced block".to_string())
    })?;

    serde_json::from_str(&block)
        .map_err(|e| TripgraphError::Parse(format!("Invalid itinerary JSON: {}", e)))
}

/// Ask the generator for a schedule covering `chosen`.
pub async fn plan_itinerary(
    chosen: &str,
    preferences: &str,
    generator: &dyn TextGenerator,
) -> Result<Vec<ItineraryEntry>> {
    let prompt = build_itinerary_prompt(chosen, preferences);
    let response = generator.generate(&prompt).await?;
    let schedule = parse_schedule(&response)?;
    log::info!("Planned itinerary with {} entries", schedule.len());
    Ok(schedule)
}
