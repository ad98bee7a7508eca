//! Merge extracted triples into the shared graph.

use serde::Serialize;

use crate::error::Result;
use crate::graph::extraction::{extract_triples, ExtractionOptions};
use crate::graph::{lock_graph, normalize_identifier, Edge, GraphStore, Node, SharedGraph, Triple};
use crate::services::Services;

/// What a population run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
    pub nodes_added: usize,
    pub edges_added: usize,
    pub nodes_total: usize,
    pub edges_total: usize,
}

/// Merge `triples` into `graph`.
///
/// Missing endpoint nodes are created from the triple's names and types; an
/// edge is created only if its ordered pair has none yet, so a differing
/// relation for an existing pair is dropped. Re-running with the same triples
/// adds nothing.
pub fn populate_graph<G: GraphStore + ?Sized>(graph: &mut G, triples: &[Triple]) -> Result<PopulateReport> {
    log::info!(
        "Input graph before modification: {} nodes and {} edges",
        graph.node_count()?,
        graph.edge_count()?
    );
    for triple in triples.iter().take(2) {
        log::debug!(
            "Sample triple: {} -[{}]-> {} ({} / {})",
            triple.node_1,
            triple.relation,
            triple.node_2,
            triple.node_1_type,
            triple.node_2_type
        );
    }

    let mut report = PopulateReport::default();

    for triple in triples {
        let source_id = normalize_identifier(&triple.node_1);
        let target_id = normalize_identifier(&triple.node_2);
        if source_id.is_empty() || target_id.is_empty() {
            log::debug!("Skipping triple with empty key: {:?}", triple);
            continue;
        }

        if !graph.has_node(&source_id)?
            && graph.add_node(Node::new(&source_id, &triple.node_1, &triple.node_1_type))?
        {
            report.nodes_added += 1;
        }

        if !graph.has_node(&target_id)?
            && graph.add_node(Node::new(&target_id, &triple.node_2, &triple.node_2_type))?
        {
            report.nodes_added += 1;
        }

        if !graph.has_edge(&source_id, &target_id)?
            && graph.add_edge(
                Edge::new(&source_id, &target_id, &triple.relation)
                    .with_attributes(&triple.attributes),
            )?
        {
            report.edges_added += 1;
        }
    }

    report.nodes_total = graph.node_count()?;
    report.edges_total = graph.edge_count()?;

    log::info!(
        "Added {} new nodes and {} new edges",
        report.nodes_added,
        report.edges_added
    );
    log::info!(
        "Output graph after modification: {} nodes and {} edges",
        report.nodes_total,
        report.edges_total
    );

    Ok(report)
}

/// Extract triples for `destination` and merge them into the shared graph.
///
/// Extraction runs without the graph lock; the lock is held only for the merge.
pub async fn ingest_destination(
    destination: &str,
    graph: &SharedGraph,
    services: Services<'_>,
    options: &ExtractionOptions,
) -> Result<PopulateReport> {
    log::info!("Creating travel knowledge graph for {}...", destination);

    let triples = extract_triples(destination, services, options).await?;

    let mut store = lock_graph(graph)?;
    populate_graph(&mut **store, &triples)
}
