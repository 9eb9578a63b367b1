//! Reverse compiler: wire document → graph.
//!
//! Only an unusable document is an error. Individual entries that cannot be
//! understood are skipped and reported in the summary's warnings.

pub mod layout;
pub mod project;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;
use crate::ir::types::{FieldRule, XrayBalancer, XrayInbound, XrayOutbound};
use crate::lower::transport::lift_stream_settings;
use crate::parse::types::*;
use crate::rules::selector_matches;

pub use project::import_project;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// One routing node per rule; otherwise rules collapse into direct edges.
    pub create_routing_nodes: bool,
    pub auto_layout: bool,
    #[serde(default)]
    pub force_mode: Option<ProjectMode>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            create_routing_nodes: true,
            auto_layout: true,
            force_mode: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inbounds: usize,
    pub outbounds: usize,
    pub balancers: usize,
    pub rules: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub mode: ProjectMode,
    pub summary: ImportSummary,
}

pub fn import_xray_config(json: &str, options: &ImportOptions) -> Result<ImportResult, ImportError> {
    let doc: Value = serde_json::from_str(json)?;
    let root = doc.as_object().ok_or(ImportError::NotAnObject)?;
    if !root.contains_key("inbounds") && !root.contains_key("outbounds") {
        return Err(ImportError::MissingSections);
    }

    let mut builder = GraphBuilder::default();

    for (i, entry) in entries(root.get("inbounds")).enumerate() {
        match serde_json::from_value::<XrayInbound>(entry.clone()) {
            Ok(inbound) => builder.add_inbound(&inbound),
            Err(e) => builder.warn(format!("Skipped inbound #{}: {}", i + 1, e)),
        }
    }
    for (i, entry) in entries(root.get("outbounds")).enumerate() {
        match serde_json::from_value::<XrayOutbound>(entry.clone()) {
            Ok(outbound) => builder.add_outbound(&outbound),
            Err(e) => builder.warn(format!("Skipped outbound #{}: {}", i + 1, e)),
        }
    }

    let routing = root.get("routing");
    for (i, entry) in entries(routing.and_then(|r| r.get("balancers"))).enumerate() {
        match serde_json::from_value::<XrayBalancer>(entry.clone()) {
            Ok(balancer) => builder.add_balancer(&balancer),
            Err(e) => builder.warn(format!("Skipped balancer #{}: {}", i + 1, e)),
        }
    }
    for (i, entry) in entries(routing.and_then(|r| r.get("rules"))).enumerate() {
        match serde_json::from_value::<FieldRule>(entry.clone()) {
            Ok(rule) => builder.add_rule(i, &rule, options.create_routing_nodes),
            Err(e) => builder.warn(format!("Skipped rule #{}: {}", i + 1, e)),
        }
    }

    let mode = options.force_mode.unwrap_or_else(|| detect_mode(&builder.nodes));
    let mut nodes = builder.nodes;
    if options.auto_layout {
        layout::auto_layout(&mut nodes);
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = builder.edges.len(),
        warnings = builder.summary.warnings.len(),
        "imported configuration"
    );

    Ok(ImportResult {
        nodes,
        edges: builder.edges,
        mode,
        summary: builder.summary,
    })
}

/// Several inbounds on distinct ports plus any proxy outbound means a multi-hop
/// infrastructure graph rather than a single client.
pub fn detect_mode(nodes: &[GraphNode]) -> ProjectMode {
    let ports: HashSet<u32> = nodes
        .iter()
        .filter_map(|n| match n {
            GraphNode::Inbound(i) => Some(i.data.port),
            _ => None,
        })
        .collect();
    let has_proxy = nodes.iter().any(|n| n.kind() == NodeKind::OutboundProxy);

    if ports.len() > 1 && has_proxy {
        ProjectMode::Infrastructure
    } else {
        ProjectMode::Simple
    }
}

fn entries(section: Option<&Value>) -> impl Iterator<Item = &Value> {
    section.and_then(Value::as_array).into_iter().flatten()
}

// =============================================================================
// GRAPH BUILDER
// =============================================================================

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    summary: ImportSummary,
    next_id: usize,
    /// tag → node id, per namespace
    inbound_ids: HashMap<String, String>,
    outbound_ids: HashMap<String, String>,
    balancer_ids: HashMap<String, String>,
    linked: HashSet<(String, String)>,
}

impl GraphBuilder {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.summary.warnings.push(message);
    }

    fn alloc(&mut self, kind: NodeKind) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }

    fn link(&mut self, source: &str, target: &str, priority: Option<u32>) {
        if !self.linked.insert((source.to_string(), target.to_string())) {
            return;
        }
        self.edges.push(GraphEdge {
            id: format!("edge-{}", self.edges.len() + 1),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: EdgeType::Default,
            data: priority.map(|p| EdgeData {
                priority: Some(p),
                ..Default::default()
            }),
        });
    }

    fn add_inbound(&mut self, inbound: &XrayInbound) {
        let Some(protocol) = InboundProtocol::parse(&inbound.protocol) else {
            self.warn(format!(
                "Skipped inbound '{}': unsupported protocol '{}'",
                inbound.tag, inbound.protocol
            ));
            return;
        };

        let id = self.alloc(NodeKind::Inbound);
        let tag = match inbound.tag.trim() {
            "" => id.clone(),
            t => t.to_string(),
        };
        let config = InboundConfig {
            tag: tag.clone(),
            protocol,
            listen: inbound.listen.clone(),
            port: inbound.port.into(),
            sniffing: inbound.sniffing.as_ref().map(|s| s.enabled),
            users: lift_users(protocol, &inbound.settings),
            method: (protocol == InboundProtocol::Shadowsocks)
                .then(|| str_field(&inbound.settings, "method"))
                .flatten(),
            transport: lift_stream_settings(inbound.stream_settings.as_ref()),
        };

        self.inbound_ids.insert(tag, id.clone());
        self.nodes.push(GraphNode::Inbound(NodeBase::new(id, config)));
        self.summary.inbounds += 1;
    }

    fn add_outbound(&mut self, outbound: &XrayOutbound) {
        let node = if let Some(protocol) = TerminalProtocol::parse(&outbound.protocol) {
            let id = self.alloc(NodeKind::OutboundTerminal);
            GraphNode::OutboundTerminal(NodeBase::new(
                id.clone(),
                TerminalOutboundConfig {
                    tag: tag_or(&outbound.tag, &id),
                    protocol,
                },
            ))
        } else if let Some(protocol) = ProxyProtocol::parse(&outbound.protocol) {
            let id = self.alloc(NodeKind::OutboundProxy);
            let mut config = lift_proxy(protocol, &outbound.settings);
            config.tag = tag_or(&outbound.tag, &id);
            config.transport = lift_stream_settings(outbound.stream_settings.as_ref());
            GraphNode::OutboundProxy(NodeBase::new(id, config))
        } else {
            self.warn(format!(
                "Skipped outbound '{}': unsupported protocol '{}'",
                outbound.tag, outbound.protocol
            ));
            return;
        };

        if let Some(tag) = node.tag() {
            self.outbound_ids.insert(tag.to_string(), node.id().to_string());
        }
        self.nodes.push(node);
        self.summary.outbounds += 1;
    }

    fn add_balancer(&mut self, balancer: &XrayBalancer) {
        let strategy = match &balancer.strategy {
            None => BalancerStrategy::Random,
            Some(block) => BalancerStrategy::parse(&block.strategy_type).unwrap_or_else(|| {
                self.warn(format!(
                    "Balancer '{}': unknown strategy '{}', using random",
                    balancer.tag, block.strategy_type
                ));
                BalancerStrategy::Random
            }),
        };

        let id = self.alloc(NodeKind::Balancer);
        let config = BalancerConfig {
            tag: tag_or(&balancer.tag, &id),
            strategy,
            selector: balancer.selector.clone(),
        };

        // Connected outbounds are the ones the selector reaches, in document order.
        let targets: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.kind().is_outbound())
            .filter(|n| n.tag().is_some_and(|t| selector_matches(&config.selector, t)))
            .map(|n| n.id().to_string())
            .collect();
        for target in &targets {
            self.link(&id, target, None);
        }

        self.balancer_ids.insert(config.tag.clone(), id.clone());
        self.nodes.push(GraphNode::Balancer(NodeBase::new(id, config)));
        self.summary.balancers += 1;
    }

    fn add_rule(&mut self, index: usize, rule: &FieldRule, create_routing_nodes: bool) {
        let target = match (&rule.outbound_tag, &rule.balancer_tag) {
            (Some(tag), _) => self.outbound_ids.get(tag).cloned().ok_or(tag),
            (None, Some(tag)) => self.balancer_ids.get(tag).cloned().ok_or(tag),
            (None, None) => {
                self.warn(format!("Skipped rule #{}: no outboundTag or balancerTag", index + 1));
                return;
            }
        };
        let target = match target {
            Ok(id) => id,
            Err(tag) => {
                self.warn(format!("Skipped rule #{}: unknown target '{}'", index + 1, tag));
                return;
            }
        };

        let listed = rule.inbound_tag.clone().unwrap_or_default();
        let mut sources = Vec::new();
        for tag in &listed {
            match self.inbound_ids.get(tag) {
                Some(id) => sources.push(id.clone()),
                None => self.warn(format!("Rule #{}: unknown inbound '{}'", index + 1, tag)),
            }
        }
        if listed.is_empty() {
            sources = self
                .nodes
                .iter()
                .filter(|n| n.kind() == NodeKind::Inbound)
                .map(|n| n.id().to_string())
                .collect();
        }

        let priority = u32::try_from(index).ok();
        if create_routing_nodes {
            let id = self.alloc(NodeKind::Routing);
            let tag = rule
                .rule_tag
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| format!("rule-{}", index + 1));
            let config = RoutingConfig {
                tag,
                predicates: RulePredicates {
                    domain: rule.domain.clone().unwrap_or_default(),
                    ip: rule.ip.clone().unwrap_or_default(),
                    port: rule.port.clone(),
                    protocol: rule.protocol.clone().unwrap_or_default(),
                    network: rule.network.clone(),
                    inbound_tag: listed.first().cloned(),
                },
            };
            self.nodes.push(GraphNode::Routing(NodeBase::new(id.clone(), config)));
            for source in &sources {
                self.link(source, &id, priority);
            }
            self.link(&id, &target, None);
        } else {
            for source in &sources {
                self.link(source, &target, priority);
            }
        }
        self.summary.rules += 1;
    }
}

fn tag_or(tag: &str, fallback: &str) -> String {
    match tag.trim() {
        "" => fallback.to_string(),
        t => t.to_string(),
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn lift_users(protocol: InboundProtocol, settings: &Value) -> Vec<InboundUser> {
    let list = |key: &str| settings.get(key).and_then(Value::as_array).cloned().unwrap_or_default();

    match protocol {
        InboundProtocol::Vless | InboundProtocol::Vmess | InboundProtocol::Trojan => list("clients")
            .iter()
            .map(|c| InboundUser {
                email: str_field(c, "email").unwrap_or_default(),
                id: str_field(c, "id"),
                password: str_field(c, "password"),
                level: c.get("level").and_then(Value::as_u64).and_then(|l| u32::try_from(l).ok()),
            })
            .collect(),
        InboundProtocol::Socks | InboundProtocol::Http => list("accounts")
            .iter()
            .map(|a| InboundUser {
                email: str_field(a, "user").unwrap_or_default(),
                password: str_field(a, "pass"),
                ..Default::default()
            })
            .collect(),
        InboundProtocol::Shadowsocks => str_field(settings, "password")
            .map(|password| InboundUser {
                password: Some(password),
                ..Default::default()
            })
            .into_iter()
            .collect(),
        InboundProtocol::DokodemoDoor => Vec::new(),
    }
}

fn lift_proxy(protocol: ProxyProtocol, settings: &Value) -> ProxyOutboundConfig {
    let first = |key: &str| {
        settings
            .get(key)
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .cloned()
            .unwrap_or(Value::Null)
    };
    let server = match protocol {
        ProxyProtocol::Vless | ProxyProtocol::Vmess => first("vnext"),
        _ => first("servers"),
    };
    let user = server
        .get("users")
        .and_then(Value::as_array)
        .and_then(|u| u.first())
        .cloned()
        .unwrap_or(Value::Null);

    ProxyOutboundConfig {
        tag: String::new(),
        protocol,
        server_address: str_field(&server, "address").unwrap_or_default(),
        server_port: server
            .get("port")
            .and_then(Value::as_u64)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(0),
        id: str_field(&user, "id"),
        password: str_field(&server, "password"),
        method: str_field(&server, "method"),
        transport: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_documents() {
        let opts = ImportOptions::default();
        assert!(matches!(
            import_xray_config("{nope", &opts),
            Err(ImportError::InvalidJson(_))
        ));
        assert!(matches!(import_xray_config("[]", &opts), Err(ImportError::NotAnObject)));
        assert!(matches!(
            import_xray_config(r#"{"log": {}}"#, &opts),
            Err(ImportError::MissingSections)
        ));
    }

    #[test]
    fn unknown_protocols_are_skipped_with_warning() {
        let json = r#"{
            "inbounds": [
                {"tag": "in1", "port": 1080, "protocol": "socks"},
                {"tag": "odd", "port": 9000, "protocol": "wireguard"}
            ],
            "outbounds": [{"tag": "direct", "protocol": "freedom"}]
        }"#;
        let result = import_xray_config(json, &ImportOptions::default()).unwrap();
        assert_eq!(result.summary.inbounds, 1);
        assert_eq!(result.summary.outbounds, 1);
        assert_eq!(result.summary.warnings.len(), 1);
        assert!(result.summary.warnings[0].contains("wireguard"));
    }

    #[test]
    fn detect_mode_needs_ports_and_proxy() {
        let json = r#"{
            "inbounds": [
                {"tag": "a", "port": 1080, "protocol": "socks"},
                {"tag": "b", "port": 443, "protocol": "vless"}
            ],
            "outbounds": [{"tag": "p", "protocol": "vless", "settings": {"vnext": [{"address": "x", "port": 1}]}}]
        }"#;
        let result = import_xray_config(json, &ImportOptions::default()).unwrap();
        assert_eq!(result.mode, ProjectMode::Infrastructure);

        let forced = ImportOptions {
            force_mode: Some(ProjectMode::Simple),
            ..Default::default()
        };
        assert_eq!(import_xray_config(json, &forced).unwrap().mode, ProjectMode::Simple);
    }
}
