#![allow(dead_code)]

use xray_graph::parse::types::*;

// =============================================================================
// Node builders
// =============================================================================

pub fn inbound(id: &str, tag: &str, protocol: InboundProtocol, port: u32) -> GraphNode {
    GraphNode::Inbound(NodeBase::new(
        id,
        InboundConfig {
            tag: tag.into(),
            protocol,
            listen: "0.0.0.0".into(),
            port,
            sniffing: None,
            users: vec![],
            method: None,
            transport: None,
        },
    ))
}

pub fn routing(id: &str, tag: &str, predicates: RulePredicates) -> GraphNode {
    GraphNode::Routing(NodeBase::new(
        id,
        RoutingConfig {
            tag: tag.into(),
            predicates,
        },
    ))
}

pub fn domains(rules: &[&str]) -> RulePredicates {
    RulePredicates {
        domain: rules.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

pub fn balancer(id: &str, tag: &str, strategy: BalancerStrategy, selector: &[&str]) -> GraphNode {
    GraphNode::Balancer(NodeBase::new(
        id,
        BalancerConfig {
            tag: tag.into(),
            strategy,
            selector: selector.iter().map(|s| s.to_string()).collect(),
        },
    ))
}

pub fn terminal(id: &str, tag: &str, protocol: TerminalProtocol) -> GraphNode {
    GraphNode::OutboundTerminal(NodeBase::new(
        id,
        TerminalOutboundConfig {
            tag: tag.into(),
            protocol,
        },
    ))
}

pub fn proxy(id: &str, tag: &str, protocol: ProxyProtocol, address: &str, port: u32) -> GraphNode {
    GraphNode::OutboundProxy(NodeBase::new(
        id,
        ProxyOutboundConfig {
            tag: tag.into(),
            protocol,
            server_address: address.into(),
            server_port: port,
            id: None,
            password: None,
            method: None,
            transport: None,
        },
    ))
}

pub fn device(id: &str, connection_type: ConnectionType) -> GraphNode {
    GraphNode::Device(NodeBase::new(
        id,
        DeviceConfig {
            label: id.into(),
            connection_type,
        },
    ))
}

/// Re-home a node onto a server group.
pub fn on_server(node: GraphNode, server_id: &str) -> GraphNode {
    let mut node = node;
    let slot = match &mut node {
        GraphNode::Device(n) => &mut n.server_id,
        GraphNode::Inbound(n) => &mut n.server_id,
        GraphNode::Routing(n) => &mut n.server_id,
        GraphNode::Balancer(n) => &mut n.server_id,
        GraphNode::OutboundTerminal(n) => &mut n.server_id,
        GraphNode::OutboundProxy(n) => &mut n.server_id,
    };
    *slot = Some(server_id.into());
    node
}

// =============================================================================
// Edge builders
// =============================================================================

pub fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
    GraphEdge {
        id: id.into(),
        source: source.into(),
        target: target.into(),
        edge_type: EdgeType::Default,
        data: None,
    }
}

pub fn edge_with_priority(id: &str, source: &str, target: &str, priority: u32) -> GraphEdge {
    GraphEdge {
        data: Some(EdgeData {
            priority: Some(priority),
            ..Default::default()
        }),
        ..edge(id, source, target)
    }
}

pub fn edge_with_transport(id: &str, source: &str, target: &str, transport: TransportSettings) -> GraphEdge {
    GraphEdge {
        data: Some(EdgeData {
            transport: Some(transport),
            ..Default::default()
        }),
        ..edge(id, source, target)
    }
}

// =============================================================================
// Topologies
// =============================================================================

/// `in1` (vless:443) → routing `domain:example.com` → proxy `out1`.
pub fn vless_chain() -> Topology {
    xray_graph::parse::parse(include_str!("../fixtures/vless_chain.json")).expect("fixture parses")
}

pub fn tags(nodes: &[GraphNode]) -> Vec<&str> {
    nodes.iter().filter_map(GraphNode::tag).collect()
}
