//! Lowering phase: graph → one wire document per server group.
//!
//! SYNC NOTE: When a node kind or config field changes in `parse::types`,
//! re-check this orchestrator and the lower submodules for full coverage.

pub mod inbound;
pub mod outbound;
pub mod partition;
pub mod routing;
pub mod simple;
pub mod transport;

use serde::{Deserialize, Serialize};

use crate::ir::types::*;
use crate::ir::validate::validate_document;
use crate::parse::graph::TopologyGraph;
use crate::parse::types::{GraphEdge, GraphNode, Server};

/// One compiled document and the filename it should be written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResult {
    pub filename: String,
    pub config: XrayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub log_level: String,
    pub domain_strategy: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            log_level: "warning".into(),
            domain_strategy: "AsIs".into(),
        }
    }
}

impl ExportOptions {
    pub(crate) fn empty_document(&self) -> XrayConfig {
        XrayConfig {
            log: XrayLog {
                loglevel: self.log_level.clone(),
            },
            inbounds: Vec::new(),
            outbounds: Vec::new(),
            routing: XrayRouting {
                domain_strategy: self.domain_strategy.clone(),
                rules: Vec::new(),
                balancers: Vec::new(),
            },
        }
    }
}

pub fn export_config(nodes: &[GraphNode], edges: &[GraphEdge], servers: &[Server]) -> Vec<ExportResult> {
    export_config_with(nodes, edges, servers, &ExportOptions::default())
}

/// Never fails: invalid or missing fields are defaulted so a graph can be
/// exported mid-edit.
pub fn export_config_with(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    servers: &[Server],
    options: &ExportOptions,
) -> Vec<ExportResult> {
    let full = TopologyGraph::build(nodes, edges);
    let partitions = partition::partition(nodes, edges, servers);
    tracing::debug!(groups = partitions.len(), "partitioned topology");

    partitions
        .iter()
        .map(|part| {
            let config = lower_group(part, &full, servers, options);
            for issue in validate_document(&config) {
                tracing::warn!(file = %part.filename, "{}", issue);
            }
            ExportResult {
                filename: part.filename.clone(),
                config,
            }
        })
        .collect()
}

fn lower_group(
    part: &partition::Partition,
    full: &TopologyGraph<'_>,
    servers: &[Server],
    options: &ExportOptions,
) -> XrayConfig {
    let local = TopologyGraph::build(&part.nodes, &part.edges);
    let mut doc = options.empty_document();

    for node in &part.nodes {
        match node {
            GraphNode::Inbound(n) => {
                let edge_transports = full
                    .incoming(&n.id)
                    .iter()
                    .filter(|e| full.is_cross_group(e))
                    .filter_map(|e| e.transport());
                let chosen = transport::pick(edge_transports, n.data.transport.as_ref());
                doc.inbounds
                    .push(inbound::lower_inbound(&n.data, transport::stream_settings(chosen)));
            }
            GraphNode::OutboundTerminal(n) => doc.outbounds.push(outbound::lower_terminal(&n.data)),
            GraphNode::OutboundProxy(n) => {
                let edge_transports = full
                    .outgoing(&n.id)
                    .iter()
                    .filter(|e| full.is_cross_group(e))
                    .filter_map(|e| e.transport());
                let chosen = transport::pick(edge_transports, n.data.transport.as_ref());
                let fallback = outbound::chained_endpoint(&n.id, full, servers);
                doc.outbounds.push(outbound::lower_proxy(
                    &n.data,
                    fallback.as_ref(),
                    transport::stream_settings(chosen),
                ));
            }
            GraphNode::Balancer(n) => doc
                .routing
                .balancers
                .push(routing::lower_balancer(&n.id, &n.data, &local)),
            GraphNode::Device(_) | GraphNode::Routing(_) => {}
        }
    }

    doc.routing.rules = routing::lower_rules(&part.nodes, &part.edges, &local);

    tracing::debug!(
        file = %part.filename,
        server = part.server_id.as_deref().unwrap_or("-"),
        inbounds = doc.inbounds.len(),
        outbounds = doc.outbounds.len(),
        rules = doc.routing.rules.len(),
        balancers = doc.routing.balancers.len(),
        "lowered group"
    );

    doc
}
