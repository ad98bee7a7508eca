//! Triple extraction: destination name -> deduplicated TSV triples.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::config::PlacesConfig;
use crate::error::Result;
use crate::graph::Triple;
use crate::llm::fenced_block;
use crate::services::Services;

/// Knobs for the lookups that feed extraction.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Prepended to the destination for the place search query.
    pub query_prefix: String,
    pub radius: u32,
    /// How many top search results get an encyclopedia lookup.
    pub context_places: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self::from(&PlacesConfig::default())
    }
}

impl From<&PlacesConfig> for ExtractionOptions {
    fn from(config: &PlacesConfig) -> Self {
        Self {
            query_prefix: config.query_prefix.clone(),
            radius: config.radius,
            context_places: config.context_places,
        }
    }
}

/// Supporting text for one of the top places of a destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextItem {
    pub place: String,
    pub description: String,
    pub destination: String,
}

/// Gather encyclopedia text for the top places of `destination`.
///
/// Any lookup failure aborts the whole context; no partial result is returned.
pub async fn build_location_context(
    destination: &str,
    services: Services<'_>,
    options: &ExtractionOptions,
) -> Result<Vec<ContextItem>> {
    let query = format!("{}{}", options.query_prefix, destination);
    let places = services.places.search(&query, options.radius).await?;

    let mut context = Vec::new();
    for place in places.iter().take(options.context_places) {
        let description = services.encyclopedia.search_and_fetch(&place.name).await?;
        context.push(ContextItem {
            place: place.name.clone(),
            description,
            destination: destination.to_string(),
        });
    }

    Ok(context)
}

/// Fixed extraction prompt asking for a TSV table of relationships.
pub fn build_extraction_prompt(destination: &str, context: &[ContextItem]) -> String {
    let context_json = serde_json::to_string_pretty(context).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Based on the following information about tourist attractions in {destination}, extract a highly detailed knowledge graph in TSV format that captures diverse relationships between attractions, their history, significance, and travel-related insights.
{context_json}

Format:
Create a TSV with the following columns:

Node_1: The name of the entity (e.g., attraction, person, event, historical figure, location, year).
Relation: The relationship between Node_1 and Node_2 (e.g., LOCATED_IN, BUILT_IN, KNOWN_FOR, DESIGNED_BY, INFLUENCED_BY, HAS_EVENT, CULTURAL_IMPORTANCE, RECOMMENDED_ACTIVITY).
Node_2: The entity that Node_1 is related to.
Node_1_Type: The type of Node_1 (e.g., Attraction, Landmark, Event, Architect, Year, Culture, TravelTip).
Node_2_Type: The type of Node_2 (e.g., Location, AttractionType, Architect, Year, CulturalAspect, RecommendedActivity).
Attributes: A JSON string with additional information (e.g., opening hours, ticket price, notable facts, visiting tips).

Guidelines:

Extract at least 8 relationships per attraction to create a dense knowledge graph.
Include core travel-related information such as:
Best time to visit (e.g., "Eiffel Tower" → BEST_VISITED_IN → "Evening")
Famous events held there (e.g., "Sydney Opera House" → HOSTS_EVENT → "Vivid Sydney Festival")
Recommended activities (e.g., "Grand Canyon" → RECOMMENDED_ACTIVITY → "Hiking")
Nearby attractions (e.g., "Louvre Museum" → NEARBY_ATTRACTION → "Seine River")
Historical significance (e.g., "Colosseum" → HISTORIC_IMPORTANCE → "Gladiator battles")
Influences (e.g., "Taj Mahal" → INFLUENCED_BY → "Mughal Architecture")
Travel insights (e.g., "Machu Picchu" → TRAVEL_TIP → "Get tickets in advance")
Ensure each attraction is connected to broader travel concepts, such as:
The country it belongs to
Related UNESCO heritage status (if applicable)
Any notable designers, rulers, or figures associated with it

Instructions for Output:

Just return the TSV content without markdown formatting or extra text.
The first line should be the header row."#
    )
}

/// Normalize the `Attributes` cell to JSON object text. Never fails.
///
/// Empty or missing becomes `{}`, a JSON object is re-serialized compactly,
/// anything else (malformed text, arrays, scalars) becomes `{}`.
pub fn normalize_attributes(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "{}".to_string();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value.to_string(),
        _ => "{}".to_string(),
    }
}

/// Strip one layer of CSV-style double quoting from a cell.
fn unquote(cell: &str) -> String {
    let cell = cell.trim();
    if cell.len() >= 2 && cell.starts_with('"') && cell.ends_with('"') {
        cell[1..cell.len() - 1].replace("\"\"", "\"")
    } else {
        cell.to_string()
    }
}

/// Parse a header-first TSV table into deduplicated triples.
///
/// Columns are located by header name. Rows missing `Node_1`, `Relation` or
/// `Node_2` are skipped; a header without those columns yields nothing.
/// Duplicates on `(Node_1, Relation, Node_2)` keep the first occurrence.
pub fn parse_triples(tsv: &str) -> Vec<Triple> {
    let mut lines = tsv.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };

    let columns: Vec<String> = header.split('\t').map(unquote).collect();
    let position = |name: &str| columns.iter().position(|c| c == name);

    let (Some(n1), Some(rel), Some(n2)) =
        (position("Node_1"), position("Relation"), position("Node_2"))
    else {
        log::warn!("TSV header lacks Node_1/Relation/Node_2 columns: {:?}", header);
        return Vec::new();
    };
    let n1_type = position("Node_1_Type");
    let n2_type = position("Node_2_Type");
    let attributes = position("Attributes");

    let mut seen = HashSet::new();
    let mut triples = Vec::new();
    let mut skipped = 0usize;

    for line in lines {
        let cells: Vec<String> = line.split('\t').map(unquote).collect();
        let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).cloned();

        let (Some(node_1), Some(relation), Some(node_2)) = (cell(Some(n1)), cell(Some(rel)), cell(Some(n2)))
        else {
            skipped += 1;
            continue;
        };
        if node_1.is_empty() || relation.is_empty() || node_2.is_empty() {
            skipped += 1;
            continue;
        }

        if !seen.insert((node_1.clone(), relation.clone(), node_2.clone())) {
            continue;
        }

        triples.push(Triple {
            node_1,
            relation,
            node_2,
            node_1_type: cell(n1_type).unwrap_or_default(),
            node_2_type: cell(n2_type).unwrap_or_default(),
            attributes: normalize_attributes(cell(attributes).as_deref()),
        });
    }

    if skipped > 0 {
        log::debug!("Skipped {} incomplete TSV rows", skipped);
    }

    triples
}

/// Extract deduplicated triples for a destination.
///
/// Lookup and generation failures propagate. A generation response with no
/// usable table yields an empty list.
pub async fn extract_triples(
    destination: &str,
    services: Services<'_>,
    options: &ExtractionOptions,
) -> Result<Vec<Triple>> {
    let context = build_location_context(destination, services, options).await?;
    log::debug!("Built extraction context from {} places", context.len());

    let prompt = build_extraction_prompt(destination, &context);
    let response = services.generator.generate(&prompt).await?;

    let tsv = fenced_block(&response, "tsv").unwrap_or(response);
    let triples = parse_triples(&tsv);
    log::info!("Extracted {} triples for {}", triples.len(), destination);

    Ok(triples)
}
