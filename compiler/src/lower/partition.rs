//! Splits a topology into one group per `serverId`.
//!
//! Only edges with both endpoints inside a group travel with it. Cross-group
//! edges stay behind; their transport is read by the endpoints from the full graph.

use std::collections::{HashMap, HashSet};

use crate::parse::types::{GraphEdge, GraphNode, Server};

/// Filename used when no node carries a `serverId`.
pub const SINGLE_FILENAME: &str = "config.json";
/// Filename of the bucket holding nodes without a `serverId` when others have one.
pub const UNASSIGNED_FILENAME: &str = "config-unassigned.json";

#[derive(Debug, Clone)]
pub struct Partition {
    pub filename: String,
    pub server_id: Option<String>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub fn partition(nodes: &[GraphNode], edges: &[GraphEdge], servers: &[Server]) -> Vec<Partition> {
    if nodes.iter().all(|n| n.server_id().is_none()) {
        let ids: HashSet<&str> = nodes.iter().map(GraphNode::id).collect();
        return vec![Partition {
            filename: SINGLE_FILENAME.into(),
            server_id: None,
            nodes: nodes.to_vec(),
            edges: edges
                .iter()
                .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
                .cloned()
                .collect(),
        }];
    }

    // Groups follow the servers list, then ids with no server record in first-seen order.
    let mut order: Vec<&str> = servers.iter().map(|s| s.id.as_str()).collect();
    for node in nodes {
        if let Some(id) = node.server_id() {
            if !order.contains(&id) {
                order.push(id);
            }
        }
    }

    let group_of: HashMap<&str, Option<&str>> = nodes.iter().map(|n| (n.id(), n.server_id())).collect();
    let mut used_names = HashSet::new();
    let mut partitions = Vec::new();

    let keys = order.into_iter().map(Some).chain(std::iter::once(None));
    for key in keys {
        let members: Vec<GraphNode> = nodes.iter().filter(|n| n.server_id() == key).cloned().collect();
        if members.is_empty() {
            continue;
        }

        let server = key.and_then(|id| servers.iter().find(|s| s.id == id));
        let base = match (key, server) {
            (None, _) => UNASSIGNED_FILENAME.to_string(),
            (Some(_), Some(s)) if !slug(&s.name).is_empty() => format!("config-{}.json", slug(&s.name)),
            (Some(id), _) => format!("config-{}.json", slug(id)),
        };

        let local_edges = edges
            .iter()
            .filter(|e| {
                group_of.get(e.source.as_str()) == Some(&key) && group_of.get(e.target.as_str()) == Some(&key)
            })
            .cloned()
            .collect();

        partitions.push(Partition {
            filename: unique_name(base, &mut used_names),
            server_id: key.map(str::to_string),
            nodes: members,
            edges: local_edges,
        });
    }

    partitions
}

fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let stem = base.trim_end_matches(".json");
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}.json");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::*;

    fn terminal(id: &str, server: Option<&str>) -> GraphNode {
        let mut base = NodeBase::new(
            id,
            TerminalOutboundConfig {
                tag: id.into(),
                protocol: TerminalProtocol::Freedom,
            },
        );
        base.server_id = server.map(str::to_string);
        GraphNode::OutboundTerminal(base)
    }

    fn server(id: &str, name: &str) -> Server {
        Server {
            id: id.into(),
            name: name.into(),
            host: "10.0.0.1".into(),
            ssh: None,
        }
    }

    #[test]
    fn no_server_ids_is_single_document() {
        let nodes = vec![terminal("a", None), terminal("b", None)];
        let parts = partition(&nodes, &[], &[]);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].filename, "config.json");
        assert_eq!(parts[0].nodes.len(), 2);
    }

    #[test]
    fn groups_follow_server_order_then_unassigned() {
        let nodes = vec![
            terminal("a", None),
            terminal("b", Some("s2")),
            terminal("c", Some("s1")),
            terminal("d", Some("ghost")),
        ];
        let servers = vec![server("s1", "Edge Node"), server("s2", "Edge Node")];
        let parts = partition(&nodes, &[], &servers);
        let ids: Vec<Option<&str>> = parts.iter().map(|p| p.server_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("s1"), Some("s2"), Some("ghost"), None]);
        let names: Vec<String> = parts.into_iter().map(|p| p.filename).collect();
        assert_eq!(
            names,
            vec![
                "config-edge-node.json",
                "config-edge-node-2.json",
                "config-ghost.json",
                "config-unassigned.json",
            ]
        );
    }

    #[test]
    fn cross_group_edges_are_dropped() {
        let nodes = vec![terminal("a", Some("s1")), terminal("b", Some("s2")), terminal("c", Some("s1"))];
        let edge = |id: &str, s: &str, t: &str| GraphEdge {
            id: id.into(),
            source: s.into(),
            target: t.into(),
            edge_type: EdgeType::Default,
            data: None,
        };
        let edges = vec![edge("e1", "a", "b"), edge("e2", "a", "c")];
        let parts = partition(&nodes, &edges, &[]);
        assert_eq!(parts[0].edges.len(), 1);
        assert_eq!(parts[0].edges[0].id, "e2");
        assert!(parts[1].edges.is_empty());
    }
}
