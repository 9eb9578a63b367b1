//! Edge transport validation (T001–T006).
//!
//! Only cross-group edges carry a real network hop. Same-group edges are intra-host
//! and compile to a bare transport, so whatever they carry is ignored.

use super::Issue;
use crate::parse::graph::TopologyGraph;
use crate::parse::types::{GraphEdge, TransportNetwork, TransportSecurity, TransportSettings};

pub fn validate_edge_transports(edges: &[GraphEdge], graph: &TopologyGraph<'_>, issues: &mut Vec<Issue>) {
    for edge in edges {
        if !graph.is_cross_group(edge) {
            continue;
        }
        if let Some(transport) = edge.transport() {
            validate_transport(transport, edge, issues);
        }
    }
}

fn validate_transport(transport: &TransportSettings, edge: &GraphEdge, issues: &mut Vec<Issue>) {
    let node_id = Some(edge.source.as_str());
    let mut push = |issue: Issue| issues.push(issue.on_edge(&edge.id));

    match transport.security {
        TransportSecurity::Reality => {
            if !matches!(transport.network, TransportNetwork::Raw | TransportNetwork::Xhttp) {
                push(Issue::error(
                    "T001",
                    format!(
                        "Reality security requires raw or xhttp network, edge '{}' uses {}",
                        edge.id,
                        transport.network.wire_name()
                    ),
                    node_id,
                ));
            }
            let reality = transport.reality_settings.clone().unwrap_or_default();
            if is_blank(&reality.public_key) {
                push(Issue::error(
                    "T002",
                    format!("Reality on edge '{}' requires a publicKey", edge.id),
                    node_id,
                ));
            }
            if is_blank(&reality.short_id) {
                push(Issue::warning(
                    "T003",
                    format!("Reality on edge '{}' should set a shortId", edge.id),
                    node_id,
                ));
            }
            if is_blank(&reality.server_name) {
                push(Issue::warning(
                    "T003",
                    format!("Reality on edge '{}' should set a serverName", edge.id),
                    node_id,
                ));
            }
        }
        TransportSecurity::Tls => {
            let server_name = transport
                .tls_settings
                .as_ref()
                .and_then(|t| t.server_name.clone());
            if is_blank(&server_name) {
                push(Issue::warning(
                    "T004",
                    format!("TLS on edge '{}' should set a serverName", edge.id),
                    node_id,
                ));
            }
        }
        TransportSecurity::None => {}
    }

    match transport.network {
        TransportNetwork::Ws => {
            let path = transport.ws_settings.as_ref().and_then(|w| w.path.clone());
            if is_blank(&path) {
                push(Issue::warning(
                    "T005",
                    format!("WebSocket on edge '{}' should set a path", edge.id),
                    node_id,
                ));
            }
        }
        TransportNetwork::Grpc => {
            let service = transport
                .grpc_settings
                .as_ref()
                .and_then(|g| g.service_name.clone());
            if is_blank(&service) {
                push(Issue::warning(
                    "T006",
                    format!("gRPC on edge '{}' should set a serviceName", edge.id),
                    node_id,
                ));
            }
        }
        TransportNetwork::Raw | TransportNetwork::Xhttp => {}
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
