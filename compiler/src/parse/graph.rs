//! petgraph-based directed graph wrapper plus a priority-sorted adjacency index.
//!
//! Built once per entry-point call so traversals never rescan the edge list.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{GraphEdge, GraphNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub edge_id: String,
    /// `outbound-proxy → inbound`: an intentional hop to another server, never a cycle.
    pub chain_hop: bool,
}

pub struct TopologyGraph<'a> {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
    nodes: HashMap<&'a str, &'a GraphNode>,
    outgoing: HashMap<&'a str, Vec<&'a GraphEdge>>,
    incoming: HashMap<&'a str, Vec<&'a GraphEdge>>,
    dangling: Vec<&'a GraphEdge>,
}

impl<'a> TopologyGraph<'a> {
    /// Edges whose endpoints are unknown are kept aside in `dangling_edges`
    /// instead of failing the build.
    pub fn build(nodes: &'a [GraphNode], edges: &'a [GraphEdge]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut node_map = HashMap::new();

        for node in nodes {
            if node_map.contains_key(node.id()) {
                continue;
            }
            let idx = graph.add_node(node.id().to_string());
            node_indices.insert(node.id().to_string(), idx);
            node_map.insert(node.id(), node);
        }

        let mut known = Vec::new();
        let mut dangling = Vec::new();
        for edge in edges {
            let source = node_map.get(edge.source.as_str());
            let target = node_map.get(edge.target.as_str());
            match (source, target) {
                (Some(s), Some(t)) => {
                    graph.add_edge(
                        node_indices[s.id()],
                        node_indices[t.id()],
                        EdgeLabel {
                            edge_id: edge.id.clone(),
                            chain_hop: s.kind() == NodeKind::OutboundProxy
                                && t.kind() == NodeKind::Inbound,
                        },
                    );
                    known.push(edge);
                }
                _ => dangling.push(edge),
            }
        }

        let outgoing = sorted_index(known.iter().copied(), |e| e.source.as_str());
        let incoming = sorted_index(known.iter().copied(), |e| e.target.as_str());

        TopologyGraph {
            graph,
            node_indices,
            nodes: node_map,
            outgoing,
            incoming,
            dangling,
        }
    }

    pub fn node(&self, id: &str) -> Option<&'a GraphNode> {
        self.nodes.get(id).copied()
    }

    /// Outgoing edges in ascending priority (missing priority last, stable otherwise).
    pub fn outgoing(&self, node_id: &str) -> &[&'a GraphEdge] {
        self.outgoing.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming(&self, node_id: &str) -> &[&'a GraphEdge] {
        self.incoming.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.outgoing(node_id).len()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.incoming(node_id).len()
    }

    pub fn dangling_edges(&self) -> &[&'a GraphEdge] {
        &self.dangling
    }

    pub fn target_of(&self, edge: &GraphEdge) -> Option<&'a GraphNode> {
        self.node(&edge.target)
    }

    pub fn source_of(&self, edge: &GraphEdge) -> Option<&'a GraphNode> {
        self.node(&edge.source)
    }

    /// Endpoints sit in different `serverId` groups (unassigned is its own group).
    pub fn is_cross_group(&self, edge: &GraphEdge) -> bool {
        match (self.source_of(edge), self.target_of(edge)) {
            (Some(s), Some(t)) => s.server_id() != t.server_id(),
            _ => false,
        }
    }

    pub fn kind_at(&self, idx: NodeIndex) -> Option<NodeKind> {
        self.node(&self.graph[idx]).map(GraphNode::kind)
    }
}

/// Group edges by `key`, each bucket in ascending priority.
pub fn sorted_index<'a, I, F>(edges: I, key: F) -> HashMap<&'a str, Vec<&'a GraphEdge>>
where
    I: IntoIterator<Item = &'a GraphEdge>,
    F: Fn(&'a GraphEdge) -> &'a str,
{
    let mut index: HashMap<&'a str, Vec<&'a GraphEdge>> = HashMap::new();
    for edge in edges {
        index.entry(key(edge)).or_default().push(edge);
    }
    for bucket in index.values_mut() {
        bucket.sort_by_key(|e| e.priority());
    }
    index
}
