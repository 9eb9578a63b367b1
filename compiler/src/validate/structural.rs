//! Graph-level structural validation rules (S001–S011).

use std::collections::HashMap;

use petgraph::graph::EdgeReference;
use petgraph::visit::{Bfs, Control, DfsEvent, EdgeFiltered, depth_first_search};

use super::Issue;
use crate::connection::is_valid_connection;
use crate::parse::graph::{EdgeLabel, TopologyGraph};
use crate::parse::types::{ConnectionType, GraphEdge, GraphNode, NodeKind, ProxyProtocol};

/// Run all structural validation rules.
pub fn validate_structural(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    graph: &TopologyGraph<'_>,
    issues: &mut Vec<Issue>,
) {
    s011_edges_reference_existing_nodes(graph, issues);
    s010_edges_follow_connection_rules(edges, graph, issues);
    s001_unique_tags(nodes, issues);
    s002_no_port_collisions(nodes, issues);
    s003_inbound_has_outgoing(nodes, graph, issues);
    s004_inbound_fed_by_proxy(nodes, graph, issues);
    s005_device_protocol_family(edges, graph, issues);
    s006_outbound_has_incoming(nodes, graph, issues);
    s007_proxy_chain_dead_end(nodes, graph, issues);
    s008_inbound_reaches_terminal(nodes, graph, issues);
    s009_no_cycles(nodes, graph, issues);
}

fn s011_edges_reference_existing_nodes(graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for edge in graph.dangling_edges() {
        let missing = if graph.node(&edge.source).is_none() {
            &edge.source
        } else {
            &edge.target
        };
        issues.push(
            Issue::error(
                "S011",
                format!("Edge '{}' references unknown node '{}'", edge.id, missing),
                None,
            )
            .on_edge(&edge.id),
        );
    }
}

fn s010_edges_follow_connection_rules(
    edges: &[GraphEdge],
    graph: &TopologyGraph<'_>,
    issues: &mut Vec<Issue>,
) {
    for edge in edges {
        let (Some(source), Some(target)) = (graph.source_of(edge), graph.target_of(edge)) else {
            continue;
        };
        let check = is_valid_connection(source.kind(), target.kind());
        if !check.valid {
            issues.push(
                Issue::error(
                    "S010",
                    format!(
                        "Edge '{}' from '{}' to '{}' is not allowed: {}",
                        edge.id,
                        source.display_name(),
                        target.display_name(),
                        check.reason.unwrap_or_default()
                    ),
                    Some(source.id()),
                )
                .on_edge(&edge.id),
            );
        }
    }
}

fn s001_unique_tags(nodes: &[GraphNode], issues: &mut Vec<Issue>) {
    let mut by_tag: HashMap<&str, Vec<&GraphNode>> = HashMap::new();
    for node in nodes {
        if let Some(tag) = node.tag().map(str::trim).filter(|t| !t.is_empty()) {
            by_tag.entry(tag).or_default().push(node);
        }
    }

    for node in nodes {
        let Some(tag) = node.tag().map(str::trim) else {
            continue;
        };
        let Some(holders) = by_tag.get(tag) else {
            continue;
        };
        if holders.len() > 1 {
            issues.push(Issue::error(
                "S001",
                format!(
                    "Tag '{}' is used by {} nodes; tags must be unique",
                    tag,
                    holders.len()
                ),
                Some(node.id()),
            ));
        }
    }
}

fn s002_no_port_collisions(nodes: &[GraphNode], issues: &mut Vec<Issue>) {
    let mut by_port: HashMap<(Option<&str>, u32), usize> = HashMap::new();
    for node in nodes {
        if let GraphNode::Inbound(n) = node {
            *by_port.entry((node.server_id(), n.data.port)).or_default() += 1;
        }
    }

    for node in nodes {
        if let GraphNode::Inbound(n) = node {
            if by_port[&(node.server_id(), n.data.port)] > 1 {
                issues.push(Issue::error(
                    "S002",
                    format!(
                        "Inbound '{}' listens on port {}, which another inbound on the same server also uses",
                        n.data.tag, n.data.port
                    ),
                    Some(&n.id),
                ));
            }
        }
    }
}

fn s003_inbound_has_outgoing(nodes: &[GraphNode], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for node in nodes {
        if node.kind() == NodeKind::Inbound && graph.outgoing_count(node.id()) == 0 {
            issues.push(Issue::warning(
                "S003",
                format!("Inbound '{}' has no outgoing connections", node.display_name()),
                Some(node.id()),
            ));
        }
    }
}

fn s004_inbound_fed_by_proxy(nodes: &[GraphNode], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for node in nodes {
        if node.kind() != NodeKind::Inbound {
            continue;
        }
        let fed = graph.incoming(node.id()).iter().any(|e| {
            graph
                .source_of(e)
                .is_some_and(|s| s.kind() == NodeKind::OutboundProxy)
        });
        if !fed {
            issues.push(Issue::info(
                "S004",
                format!(
                    "Inbound '{}' is not reached by any proxy outbound; it only serves external clients",
                    node.display_name()
                ),
                Some(node.id()),
            ));
        }
    }
}

fn s005_device_protocol_family(edges: &[GraphEdge], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for edge in edges {
        let (Some(GraphNode::Device(device)), Some(GraphNode::OutboundProxy(proxy))) =
            (graph.source_of(edge), graph.target_of(edge))
        else {
            continue;
        };
        let required = match device.data.connection_type {
            ConnectionType::Http => ProxyProtocol::Http,
            ConnectionType::Socks | ConnectionType::Tun2socks => ProxyProtocol::Socks,
        };
        if proxy.data.protocol != required {
            let message = format!(
                "Device connects over {} but outbound '{}' speaks {}; expected a {} outbound",
                device.data.connection_type.as_str(),
                proxy.data.tag,
                proxy.data.protocol.as_str(),
                required.as_str()
            );
            issues.push(Issue::error("S005", message.clone(), Some(&device.id)).on_edge(&edge.id));
            issues.push(Issue::error("S005", message, Some(&proxy.id)).on_edge(&edge.id));
        }
    }
}

fn s006_outbound_has_incoming(nodes: &[GraphNode], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for node in nodes {
        if node.kind().is_outbound() && graph.incoming_count(node.id()) == 0 {
            issues.push(Issue::warning(
                "S006",
                format!("Outbound '{}' has no incoming connections and is never used", node.display_name()),
                Some(node.id()),
            ));
        }
    }
}

fn s007_proxy_chain_dead_end(nodes: &[GraphNode], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for node in nodes {
        if node.kind() == NodeKind::OutboundProxy && graph.outgoing_count(node.id()) == 0 {
            issues.push(Issue::warning(
                "S007",
                format!(
                    "Proxy outbound '{}' ends the chain; connect it to the next server's inbound \
                     if traffic should continue through your own infrastructure",
                    node.display_name()
                ),
                Some(node.id()),
            ));
        }
    }
}

fn s008_inbound_reaches_terminal(nodes: &[GraphNode], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for node in nodes {
        if node.kind() != NodeKind::Inbound {
            continue;
        }
        let Some(&start) = graph.node_indices.get(node.id()) else {
            continue;
        };

        let mut reaches_terminal = false;
        let mut bfs = Bfs::new(&graph.graph, start);
        while let Some(nx) = bfs.next(&graph.graph) {
            if graph.kind_at(nx) == Some(NodeKind::OutboundTerminal) {
                reaches_terminal = true;
                break;
            }
        }

        if !reaches_terminal {
            issues.push(Issue::warning(
                "S008",
                format!(
                    "Inbound '{}' cannot reach any terminal outbound; traffic has no final destination",
                    node.display_name()
                ),
                Some(node.id()),
            ));
        }
    }
}

/// Back-edge search over the graph without `outbound-proxy → inbound` hops.
/// Reports the first cycle found, on the re-entered node.
fn s009_no_cycles(nodes: &[GraphNode], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    let local = EdgeFiltered::from_fn(&graph.graph, |e: EdgeReference<'_, EdgeLabel>| {
        !e.weight().chain_hop
    });
    let starts = nodes
        .iter()
        .filter_map(|n| graph.node_indices.get(n.id()).copied());

    let found = depth_first_search(&local, starts, |event| match event {
        DfsEvent::BackEdge(from, to) => Control::Break((from, to)),
        _ => Control::Continue,
    });

    if let Some((from, to)) = found.break_value() {
        let from_id = &graph.graph[from];
        let to_id = &graph.graph[to];
        let name = |id: &str| {
            graph
                .node(id)
                .map(|n| n.display_name().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        issues.push(Issue::error(
            "S009",
            format!(
                "Cycle detected: the connection from '{}' back to '{}' closes a loop",
                name(from_id),
                name(to_id)
            ),
            Some(to_id),
        ));
    }
}
