//! Bounded-depth context traversal: seed place -> relation-chain sentences.

use crate::error::Result;
use crate::graph::{normalize_identifier, GraphStore};

/// Context used when no seed produced any description.
pub const NO_RELATIONSHIP_DATA: &str =
    "No relationship data could be retrieved from the knowledge graph for the given places.";

/// Relation labels along `path`, one per consecutive pair that has an edge.
pub fn relation_chain<G: GraphStore + ?Sized>(graph: &G, path: &[String]) -> Result<Vec<String>> {
    let mut relations = Vec::with_capacity(path.len().saturating_sub(1));
    for step in path.windows(2) {
        if let Some(edge) = graph.edge(&step[0], &step[1])? {
            relations.push(edge.relation_label);
        }
    }
    Ok(relations)
}

/// Describe everything within `max_depth` hops of `seed`.
///
/// Runs one pass per cutoff `1..=max_depth`, recomputing reachability each
/// time, so a node within `d` hops is described once in every pass with
/// cutoff `>= d`. Each target gets one shortest path. A seed missing from the
/// graph yields a single not-found sentence; a store error partway through
/// keeps what was produced so far and appends an error sentence.
pub fn describe_context<G: GraphStore + ?Sized>(graph: &G, seed: &str, max_depth: usize) -> Vec<String> {
    let seed_name = seed.replace('"', "");
    let seed_id = normalize_identifier(&seed_name);

    let seed_node = match graph.node(&seed_id) {
        Ok(Some(node)) => node,
        Ok(None) => {
            log::debug!("Node {} not found in graph", seed_id);
            return vec![format!(
                "Node \"{}\" was not found in the knowledge graph.",
                seed_name
            )];
        }
        Err(e) => {
            log::warn!("Error processing place '{}': {}", seed_name, e);
            return vec![processing_error(&seed_name, &e)];
        }
    };
    log::debug!("Found node {} in graph", seed_id);

    let seed_type = if seed_node.type_tag.is_empty() {
        "unknown type".to_string()
    } else {
        seed_node.type_tag
    };

    let mut descriptions = Vec::new();
    if let Err(e) = describe_passes(graph, &seed_name, &seed_id, &seed_type, max_depth, &mut descriptions) {
        log::warn!("Error processing place '{}': {}", seed_name, e);
        descriptions.push(processing_error(&seed_name, &e));
    }
    descriptions
}

fn processing_error(seed_name: &str, err: &crate::TripgraphError) -> String {
    format!("Error processing relationships for \"{}\": {}", seed_name, err)
}

fn describe_passes<G: GraphStore + ?Sized>(
    graph: &G,
    seed_name: &str,
    seed_id: &str,
    seed_type: &str,
    max_depth: usize,
    out: &mut Vec<String>,
) -> Result<()> {
    for depth in 1..=max_depth {
        for (target_id, _) in graph.reachable_within(seed_id, depth)? {
            if target_id == seed_id {
                continue;
            }

            let Some(path) = graph.shortest_path(seed_id, &target_id)? else {
                continue;
            };
            let relations = relation_chain(graph, &path)?;

            let (target_name, target_type) = match graph.node(&target_id)? {
                Some(node) => (
                    node.display_name,
                    if node.type_tag.is_empty() {
                        "unknown type".to_string()
                    } else {
                        node.type_tag
                    },
                ),
                None => ("unknown".to_string(), "unknown type".to_string()),
            };

            let description = format!(
                "Node \"{}, a {}\" is connected to Node \"{}, a {}\" by the relationships: \"{}\".",
                seed_name,
                seed_type,
                target_name,
                target_type,
                relations.join(", ")
            );
            log::debug!("{}", description);
            out.push(description);
        }
    }
    Ok(())
}

/// Descriptions for every seed in order, or the single fallback sentence when
/// there are none, so the prompt context is never empty.
pub fn build_context<G, S>(graph: &G, seeds: &[S], max_depth: usize) -> Vec<String>
where
    G: GraphStore + ?Sized,
    S: AsRef<str>,
{
    let mut context: Vec<String> = seeds
        .iter()
        .flat_map(|seed| describe_context(graph, seed.as_ref(), max_depth))
        .collect();

    if context.is_empty() {
        context.push(NO_RELATIONSHIP_DATA.to_string());
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TripgraphError;
    use crate::graph::{Edge, MemoryGraph, Node};

    fn chain_graph() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph.add_node(Node::new("a", "A", "Attraction")).unwrap();
        graph.add_node(Node::new("b", "B", "Architect")).unwrap();
        graph.add_node(Node::new("c", "C", "Year")).unwrap();
        graph.add_edge(Edge::new("a", "b", "R1")).unwrap();
        graph.add_edge(Edge::new("b", "c", "R2")).unwrap();
        graph
    }

    #[test]
    fn test_two_hop_chain() {
        let graph = chain_graph();
        let lines = describe_context(&graph, "A", 2);

        // pass 1: B; pass 2: B, C
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Node \"A, a Attraction\" is connected to Node \"B, a Architect\" by the relationships: \"R1\"."
        );
        assert_eq!(
            lines[2],
            "Node \"A, a Attraction\" is connected to Node \"C, a Year\" by the relationships: \"R1, R2\"."
        );

        let for_b: Vec<_> = lines.iter().filter(|l| l.contains("Node \"B,")).collect();
        assert!(for_b.iter().all(|l| l.contains("\"R1\"") && !l.contains("R2")));
    }

    #[test]
    fn test_default_depth_repeats_per_pass() {
        let graph = chain_graph();
        let lines = describe_context(&graph, "A", 3);
        // B appears in passes 1..=3, C in passes 2..=3
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.iter().filter(|l| l.contains("\"R1, R2\"")).count(), 2);
    }

    #[test]
    fn test_depth_one_misses_two_hop_target() {
        let graph = chain_graph();
        let lines = describe_context(&graph, "A", 1);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].contains("Node \"C,"));
    }

    #[test]
    fn test_missing_seed_single_line() {
        let graph = chain_graph();
        let lines = describe_context(&graph, "Big Ben", 3);
        assert_eq!(
            lines,
            vec!["Node \"Big Ben\" was not found in the knowledge graph.".to_string()]
        );
    }

    #[test]
    fn test_seed_quotes_stripped_and_normalized() {
        let mut graph = MemoryGraph::new();
        graph.add_node(Node::new("the_kiss", "The Kiss", "Artwork")).unwrap();
        graph.add_node(Node::new("klimt", "Gustav Klimt", "Artist")).unwrap();
        graph.add_edge(Edge::new("the_kiss", "klimt", "PAINTED_BY")).unwrap();

        let lines = describe_context(&graph, "The \"Kiss\"", 1);
        assert_eq!(
            lines,
            vec!["Node \"The Kiss, a Artwork\" is connected to Node \"Gustav Klimt, a Artist\" by the relationships: \"PAINTED_BY\".".to_string()]
        );
    }

    #[test]
    fn test_isolated_seed_has_no_lines() {
        let mut graph = MemoryGraph::new();
        graph.add_node(Node::new("lonely", "Lonely", "Attraction")).unwrap();
        assert!(describe_context(&graph, "Lonely", 3).is_empty());
    }

    #[test]
    fn test_missing_types_fall_back() {
        let mut graph = MemoryGraph::new();
        graph.add_node(Node::new("x", "X", "")).unwrap();
        graph.add_node(Node::new("y", "Y", "")).unwrap();
        graph.add_edge(Edge::new("x", "y", "NEAR")).unwrap();

        let lines = describe_context(&graph, "X", 1);
        assert_eq!(
            lines[0],
            "Node \"X, a unknown type\" is connected to Node \"Y, a unknown type\" by the relationships: \"NEAR\"."
        );
    }

    #[test]
    fn test_self_loop_not_described() {
        let mut graph = MemoryGraph::new();
        graph.add_node(Node::new("x", "X", "T")).unwrap();
        graph.add_edge(Edge::new("x", "x", "SELF")).unwrap();
        assert!(describe_context(&graph, "X", 3).is_empty());
    }

    #[test]
    fn test_build_context_fallback() {
        let graph = MemoryGraph::new();
        let none: [&str; 0] = [];
        assert_eq!(build_context(&graph, &none, 3), vec![NO_RELATIONSHIP_DATA.to_string()]);
    }

    #[test]
    fn test_build_context_concatenates_seeds() {
        let graph = chain_graph();
        let lines = build_context(&graph, &["A", "Nowhere"], 1);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("was not found"));
    }

    /// Store whose reachability query fails after the seed lookup succeeds.
    struct BrokenReachability(MemoryGraph);

    impl GraphStore for BrokenReachability {
        fn node_count(&self) -> Result<usize> {
            self.0.node_count()
        }
        fn edge_count(&self) -> Result<usize> {
            self.0.edge_count()
        }
        fn node(&self, id: &str) -> Result<Option<Node>> {
            self.0.node(id)
        }
        fn add_node(&mut self, node: Node) -> Result<bool> {
            self.0.add_node(node)
        }
        fn edge(&self, source_id: &str, target_id: &str) -> Result<Option<Edge>> {
            self.0.edge(source_id, target_id)
        }
        fn add_edge(&mut self, edge: Edge) -> Result<bool> {
            self.0.add_edge(edge)
        }
        fn successors(&self, _id: &str) -> Result<Vec<String>> {
            Err(TripgraphError::Graph("backend unavailable".to_string()))
        }
    }

    #[test]
    fn test_store_error_is_non_fatal() {
        let graph = BrokenReachability(chain_graph());
        let lines = describe_context(&graph, "A", 3);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error processing relationships for \"A\""));
        assert!(lines[0].contains("backend unavailable"));
    }
}
