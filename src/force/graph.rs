use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;
use tracing::{debug, warn};

use crate::data::GraphDocument;

#[derive(Clone, Debug, Default)]
pub struct GraphNode {
    pub id: String,
    pub group: String,
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Pin; while set the node ignores forces and sits here.
    pub fixed: Option<Vec2>,
}

/// Link resolved to node indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

/// Node/edge graph with adjacency lists built once at load time.
#[derive(Clone, Debug, Default)]
pub struct ForceGraph {
    pub(super) nodes: Vec<GraphNode>,
    pub(super) edges: Vec<GraphEdge>,
    neighbors: Vec<Vec<usize>>,
    incident: Vec<Vec<usize>>,
}

impl ForceGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let mut neighbors = vec![Vec::new(); nodes.len()];
        let mut incident = vec![Vec::new(); nodes.len()];
        for (index, edge) in edges.iter().enumerate() {
            incident[edge.source].push(index);
            if edge.source == edge.target {
                continue;
            }
            incident[edge.target].push(index);
            neighbors[edge.source].push(edge.target);
            neighbors[edge.target].push(edge.source);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            nodes,
            edges,
            neighbors,
            incident,
        }
    }

    /// Resolves a loaded document. Duplicate node ids keep the first entry;
    /// links naming unknown nodes are dropped.
    pub fn from_document(document: &GraphDocument) -> Self {
        let mut index_by_id: HashMap<String, usize> = HashMap::new();
        let mut nodes = Vec::with_capacity(document.nodes.len());
        for spec in &document.nodes {
            let id = spec.key();
            if index_by_id.contains_key(&id) {
                warn!(%id, "duplicate graph node ignored");
                continue;
            }
            index_by_id.insert(id.clone(), nodes.len());
            nodes.push(GraphNode {
                id,
                group: spec.group.as_key(),
                name: spec.label(),
                ..GraphNode::default()
            });
        }

        let mut edges = Vec::with_capacity(document.links.len());
        for link in &document.links {
            let (source, target) = (link.source.as_key(), link.target.as_key());
            match (index_by_id.get(&source), index_by_id.get(&target)) {
                (Some(&source), Some(&target)) => edges.push(GraphEdge { source, target }),
                _ => warn!(%source, %target, "link with unknown endpoint dropped"),
            }
        }

        debug!(nodes = nodes.len(), edges = edges.len(), "resolved graph");
        Self::new(nodes, edges)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes one edge away from `index`.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Indices of the edges touching `index`.
    pub fn incident_edges(&self, index: usize) -> &[usize] {
        self.incident.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn highlight(&self, index: usize) -> NeighborHighlight {
        let mut related_nodes = HashSet::from([index]);
        related_nodes.extend(self.neighbors(index).iter().copied());
        let related_edges = self.incident_edges(index).iter().copied().collect();
        NeighborHighlight {
            focus: index,
            related_nodes,
            related_edges,
        }
    }
}

/// The hovered node, its direct neighbours and the links between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborHighlight {
    pub focus: usize,
    pub related_nodes: HashSet<usize>,
    pub related_edges: HashSet<usize>,
}

impl NeighborHighlight {
    pub fn contains_node(&self, index: usize) -> bool {
        self.related_nodes.contains(&index)
    }

    pub fn contains_edge(&self, index: usize) -> bool {
        self.related_edges.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> GraphDocument {
        serde_json::from_str(
            r#"{
                "nodes": [{"id": "a", "group": 1}, {"id": "b", "group": 1}, {"id": "c", "group": 2}, {"id": "a"}],
                "links": [
                    {"source": "a", "target": "b"},
                    {"source": "b", "target": "c"},
                    {"source": "c", "target": "ghost"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn unknown_endpoints_and_duplicates_are_dropped() {
        let graph = ForceGraph::from_document(&document());
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.nodes()[0].group, "1");
    }

    #[test]
    fn neighbours_come_from_adjacency() {
        let graph = ForceGraph::from_document(&document());
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert_eq!(graph.neighbors(0), &[1]);
        assert!(graph.neighbors(9).is_empty());

        let highlight = graph.highlight(0);
        assert!(highlight.contains_node(0) && highlight.contains_node(1));
        assert!(!highlight.contains_node(2));
        assert!(highlight.contains_edge(0));
        assert!(!highlight.contains_edge(1));
    }
}
