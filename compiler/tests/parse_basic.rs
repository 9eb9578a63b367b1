//! Integration tests for topology parsing and the connection checker.

use xray_graph::connection::is_valid_connection;
use xray_graph::parse::{self, TopologyGraph};
use xray_graph::parse::types::*;

#[test]
fn parses_two_server_fixture() {
    let t = parse::parse(include_str!("fixtures/two_servers.json")).expect("should parse");
    assert_eq!(t.nodes.len(), 4);
    assert_eq!(t.servers.len(), 2);
    assert_eq!(t.servers[0].ssh.as_ref().map(|s| s.port), Some(22));
    assert_eq!(t.nodes[1].kind(), NodeKind::OutboundProxy);
    assert_eq!(t.nodes[1].server_id(), Some("srv-entry"));

    let transport = t.edges[1].transport().expect("edge transport");
    assert_eq!(transport.network, TransportNetwork::Ws);
    assert_eq!(transport.security, TransportSecurity::Tls);
    assert_eq!(t.edges[0].priority(), DEFAULT_PRIORITY);
}

#[test]
fn cross_group_edges() {
    let t = parse::parse(include_str!("fixtures/two_servers.json")).unwrap();
    let graph = TopologyGraph::build(&t.nodes, &t.edges);
    let cross: Vec<&str> = t
        .edges
        .iter()
        .filter(|e| graph.is_cross_group(e))
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(cross, vec!["e2"]);
}

#[test]
fn parse_error_names_the_offending_node() {
    let json = r#"{"nodes": [
        {"id": "ok", "nodeType": "outbound-terminal", "data": {"tag": "direct", "protocol": "freedom"}},
        {"id": "bad", "nodeType": "inbound", "data": {"tag": "in", "protocol": "socks", "port": "not-a-port"}}
    ]}"#;
    let errors = parse::parse(json).unwrap_err();
    assert_eq!(errors[0].node_id.as_deref(), Some("bad"));
    assert!(errors[0].to_string().ends_with("(node 'bad')"));

    let errors = parse::parse("{not json").unwrap_err();
    assert_eq!(errors[0].node_id, None);
}

#[test]
fn unknown_node_type_is_p001() {
    let errors = parse::parse(r#"{"nodes": [{"id": "x", "nodeType": "router", "data": {}}]}"#).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "P001");
    assert!(errors[0].to_string().starts_with("[Parse:P001]"));
}

#[test]
fn every_edge_in_the_fixture_is_allowed() {
    let t = parse::parse(include_str!("fixtures/two_servers.json")).unwrap();
    let graph = TopologyGraph::build(&t.nodes, &t.edges);
    for edge in &t.edges {
        let source = graph.source_of(edge).unwrap().kind();
        let target = graph.target_of(edge).unwrap().kind();
        let check = is_valid_connection(source, target);
        assert!(check.valid, "{} → {}: {:?}", source, target, check.reason);
    }
}

#[test]
fn node_kind_names_round_trip() {
    for kind in [
        NodeKind::Device,
        NodeKind::Inbound,
        NodeKind::Routing,
        NodeKind::Balancer,
        NodeKind::OutboundTerminal,
        NodeKind::OutboundProxy,
    ] {
        assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
    }
}
