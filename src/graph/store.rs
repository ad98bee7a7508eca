//! Graph store abstraction and the in-memory backend.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{GraphBackend, GraphConfig};
use crate::error::{Result, TripgraphError};
use crate::graph::{Edge, Node, SqliteGraph};

/// Narrow interface over a directed graph keyed by canonical node id.
///
/// Writes are append-only: `add_node` and `add_edge` never overwrite, they
/// report `false` when the key (or ordered pair) already exists.
pub trait GraphStore {
    fn node_count(&self) -> Result<usize>;

    fn edge_count(&self) -> Result<usize>;

    fn node(&self, id: &str) -> Result<Option<Node>>;

    fn has_node(&self, id: &str) -> Result<bool> {
        Ok(self.node(id)?.is_some())
    }

    /// Insert a node unless its id is taken. Returns whether it was inserted.
    fn add_node(&mut self, node: Node) -> Result<bool>;

    fn edge(&self, source_id: &str, target_id: &str) -> Result<Option<Edge>>;

    fn has_edge(&self, source_id: &str, target_id: &str) -> Result<bool> {
        Ok(self.edge(source_id, target_id)?.is_some())
    }

    /// Insert an edge unless the ordered pair already has one. Both endpoints
    /// must exist. Returns whether it was inserted.
    fn add_edge(&mut self, edge: Edge) -> Result<bool>;

    /// Direct successors of `id`, in edge insertion order.
    fn successors(&self, id: &str) -> Result<Vec<String>>;

    /// Nodes reachable from `source` within `cutoff` hops, paired with their
    /// hop distance, in BFS discovery order. Includes `source` at distance 0.
    /// Empty when `source` is not in the graph.
    fn reachable_within(&self, source: &str, cutoff: usize) -> Result<Vec<(String, usize)>> {
        if !self.has_node(source)? {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        let mut out = Vec::new();

        seen.insert(source.to_string());
        queue.push_back((source.to_string(), 0));

        while let Some((id, depth)) = queue.pop_front() {
            out.push((id.clone(), depth));
            if depth >= cutoff {
                continue;
            }
            for next in self.successors(&id)? {
                if seen.insert(next.clone()) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        Ok(out)
    }

    /// One shortest directed path from `source` to `target`, endpoints included.
    /// Ties go to the first path BFS discovers. `None` when no path exists.
    fn shortest_path(&self, source: &str, target: &str) -> Result<Option<Vec<String>>> {
        if !self.has_node(source)? || !self.has_node(target)? {
            return Ok(None);
        }
        if source == target {
            return Ok(Some(vec![source.to_string()]));
        }

        let mut predecessors: HashMap<String, String> = HashMap::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        seen.insert(source.to_string());
        queue.push_back(source.to_string());

        let mut found = false;
        'search: while let Some(id) = queue.pop_front() {
            for next in self.successors(&id)? {
                if !seen.insert(next.clone()) {
                    continue;
                }
                predecessors.insert(next.clone(), id.clone());
                if next == target {
                    found = true;
                    break 'search;
                }
                queue.push_back(next);
            }
        }

        if !found {
            return Ok(None);
        }

        let mut path = vec![target.to_string()];
        let mut current = target;
        while let Some(prev) = predecessors.get(current) {
            path.push(prev.clone());
            current = prev.as_str();
        }
        path.reverse();
        Ok(Some(path))
    }
}

/// Process-wide graph handle shared by request flows.
///
/// The mutex makes individual store calls atomic; nothing spans a whole
/// ingestion. Never hold the guard across an `.await`.
pub type SharedGraph = Arc<Mutex<Box<dyn GraphStore + Send>>>;

/// Wrap a store into a [`SharedGraph`].
pub fn shared<G: GraphStore + Send + 'static>(store: G) -> SharedGraph {
    Arc::new(Mutex::new(Box::new(store)))
}

/// Lock the shared graph, surfacing a poisoned lock as a graph error.
pub fn lock_graph(graph: &SharedGraph) -> Result<MutexGuard<'_, Box<dyn GraphStore + Send>>> {
    graph
        .lock()
        .map_err(|_| TripgraphError::Graph("graph lock poisoned".to_string()))
}

/// Open the store selected in configuration.
pub fn open_store(config: &GraphConfig) -> Result<SharedGraph> {
    match config.backend {
        GraphBackend::Memory => {
            log::info!("Using in-memory knowledge graph");
            Ok(shared(MemoryGraph::new()))
        }
        GraphBackend::Sqlite => {
            log::info!("Using sqlite knowledge graph at {}", config.db_path.display());
            Ok(shared(SqliteGraph::open(&config.db_path)?))
        }
    }
}

/// In-memory graph store. Contents live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: HashMap<String, Node>,
    edges: HashMap<(String, String), Edge>,
    adjacency: HashMap<String, Vec<String>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphStore for MemoryGraph {
    fn node_count(&self) -> Result<usize> {
        Ok(self.nodes.len())
    }

    fn edge_count(&self) -> Result<usize> {
        Ok(self.edges.len())
    }

    fn node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.nodes.get(id).cloned())
    }

    fn add_node(&mut self, node: Node) -> Result<bool> {
        if self.nodes.contains_key(&node.id) {
            return Ok(false);
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(true)
    }

    fn edge(&self, source_id: &str, target_id: &str) -> Result<Option<Edge>> {
        Ok(self
            .edges
            .get(&(source_id.to_string(), target_id.to_string()))
            .cloned())
    }

    fn add_edge(&mut self, edge: Edge) -> Result<bool> {
        for endpoint in [&edge.source_id, &edge.target_id] {
            if !self.nodes.contains_key(endpoint) {
                return Err(TripgraphError::Graph(format!(
                    "edge endpoint {} does not exist",
                    endpoint
                )));
            }
        }

        let key = (edge.source_id.clone(), edge.target_id.clone());
        if self.edges.contains_key(&key) {
            return Ok(false);
        }
        self.adjacency
            .entry(edge.source_id.clone())
            .or_default()
            .push(edge.target_id.clone());
        self.edges.insert(key, edge);
        Ok(true)
    }

    fn successors(&self, id: &str) -> Result<Vec<String>> {
        Ok(self.adjacency.get(id).cloned().unwrap_or_default())
    }
}
