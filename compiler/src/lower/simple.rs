//! Simple mode: a single-user client graph (`user`, `server`, `internet`,
//! `block`, `rules`) compiled to `client.json`, plus one `server-<tag>.json`
//! for every server that chains to another server.
//!
//! Inbound, outbound, transport and rule building are the general-mode ones.

use std::collections::HashMap;

use super::inbound::lower_inbound;
use super::outbound::{lower_proxy, lower_terminal};
use super::routing::{RuleTarget, field_rule};
use super::transport::stream_settings;
use super::{ExportOptions, ExportResult};
use crate::ir::types::{XrayConfig, XrayInbound};
use crate::ir::validate::validate_document;
use crate::parse::graph::sorted_index;
use crate::parse::types::*;

pub const CLIENT_FILENAME: &str = "client.json";
const LOCAL_LISTEN: &str = "127.0.0.1";

impl From<&SimpleServerConfig> for ProxyOutboundConfig {
    fn from(server: &SimpleServerConfig) -> Self {
        ProxyOutboundConfig {
            tag: server.tag.clone(),
            protocol: server.protocol,
            server_address: server.address.clone(),
            server_port: server.port,
            id: server.id.clone(),
            password: server.password.clone(),
            method: server.method.clone(),
            transport: server.transport.clone(),
        }
    }
}

pub fn export_simple(graph: &SimpleGraph) -> Vec<ExportResult> {
    export_simple_with(graph, &ExportOptions::default())
}

pub fn export_simple_with(graph: &SimpleGraph, options: &ExportOptions) -> Vec<ExportResult> {
    let by_id: HashMap<&str, &SimpleNode> = graph.nodes.iter().map(|n| (n.id(), n)).collect();
    let outgoing = sorted_index(&graph.edges, |e| e.source.as_str());
    let targets_of = |id: &str| -> Vec<&SimpleNode> {
        outgoing
            .get(id)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|e| by_id.get(e.target.as_str()).copied())
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut results = vec![ExportResult {
        filename: CLIENT_FILENAME.into(),
        config: client_document(graph, &targets_of, options),
    }];

    for node in &graph.nodes {
        let SimpleNode::Server(server) = node else {
            continue;
        };
        let Some(SimpleNode::Server(next)) = targets_of(server.id.as_str())
            .into_iter()
            .find(|t| matches!(t, SimpleNode::Server(_)))
        else {
            continue;
        };
        results.push(ExportResult {
            filename: format!("server-{}.json", server.data.tag),
            config: relay_document(&server.data, &next.data, options),
        });
    }

    for result in &results {
        for issue in validate_document(&result.config) {
            tracing::warn!(file = %result.filename, "{}", issue);
        }
    }
    tracing::debug!(files = results.len(), "compiled simple-mode graph");
    results
}

fn client_document<'a>(
    graph: &'a SimpleGraph,
    targets_of: &dyn Fn(&str) -> Vec<&'a SimpleNode>,
    options: &ExportOptions,
) -> XrayConfig {
    let mut doc = options.empty_document();

    let user = graph.nodes.iter().find_map(|n| match n {
        SimpleNode::User(u) => Some(u),
        _ => None,
    });
    let ports = user.map(|u| u.data.clone()).unwrap_or_default();
    doc.inbounds.push(local_inbound("socks-in", InboundProtocol::Socks, ports.socks_port));
    if let Some(port) = ports.http_port {
        doc.inbounds.push(local_inbound("http-in", InboundProtocol::Http, port));
    }

    // The user's first direct target is the default route, so it goes first.
    let default_tag = user.and_then(|u| {
        targets_of(&u.id)
            .into_iter()
            .find_map(SimpleNode::outbound_tag)
    });

    for node in &graph.nodes {
        let outbound = match node {
            SimpleNode::Server(n) => lower_proxy(
                &ProxyOutboundConfig::from(&n.data),
                None,
                stream_settings(n.data.transport.as_ref()),
            ),
            SimpleNode::Internet(n) => lower_terminal(&TerminalOutboundConfig {
                tag: n.data.tag.clone(),
                protocol: TerminalProtocol::Freedom,
            }),
            SimpleNode::Block(n) => lower_terminal(&TerminalOutboundConfig {
                tag: n.data.tag.clone(),
                protocol: TerminalProtocol::Blackhole,
            }),
            SimpleNode::User(_) | SimpleNode::Rules(_) => continue,
        };
        if Some(outbound.tag.as_str()) == default_tag {
            doc.outbounds.insert(0, outbound);
        } else {
            doc.outbounds.push(outbound);
        }
    }
    let has_internet = graph.nodes.iter().any(|n| matches!(n, SimpleNode::Internet(_)));
    if !has_internet && !doc.outbounds.iter().any(|o| o.tag == "direct") {
        doc.outbounds.push(lower_terminal(&TerminalOutboundConfig {
            tag: "direct".into(),
            protocol: TerminalProtocol::Freedom,
        }));
    }

    for node in &graph.nodes {
        let SimpleNode::Rules(rules) = node else {
            continue;
        };
        for target in targets_of(&rules.id) {
            if let Some(tag) = target.outbound_tag() {
                doc.routing
                    .rules
                    .push(field_rule(&rules.data.predicates, RuleTarget::Outbound(tag)));
            }
        }
    }

    doc
}

/// Server-side document for `server`: accept its clients, forward to `next`.
fn relay_document(server: &SimpleServerConfig, next: &SimpleServerConfig, options: &ExportOptions) -> XrayConfig {
    let mut doc = options.empty_document();

    let user = InboundUser {
        email: String::new(),
        id: server.id.clone(),
        password: server.password.clone(),
        level: None,
    };
    let listener = InboundConfig {
        tag: format!("{}-in", server.tag),
        protocol: server.protocol.into(),
        listen: String::new(),
        port: server.port,
        sniffing: None,
        users: vec![user],
        method: server.method.clone(),
        transport: server.transport.clone(),
    };
    doc.inbounds
        .push(lower_inbound(&listener, stream_settings(listener.transport.as_ref())));

    doc.outbounds.push(lower_proxy(
        &ProxyOutboundConfig::from(next),
        None,
        stream_settings(next.transport.as_ref()),
    ));
    doc.outbounds.push(lower_terminal(&TerminalOutboundConfig {
        tag: "direct".into(),
        protocol: TerminalProtocol::Freedom,
    }));

    let chain = RulePredicates {
        inbound_tag: Some(listener.tag.clone()),
        ..Default::default()
    };
    doc.routing
        .rules
        .push(field_rule(&chain, RuleTarget::Outbound(&next.tag)));

    doc
}

fn local_inbound(tag: &str, protocol: InboundProtocol, port: u16) -> XrayInbound {
    lower_inbound(
        &InboundConfig {
            tag: tag.into(),
            protocol,
            listen: LOCAL_LISTEN.into(),
            port: port.into(),
            sniffing: Some(true),
            users: Vec::new(),
            method: None,
            transport: None,
        },
        None,
    )
}
