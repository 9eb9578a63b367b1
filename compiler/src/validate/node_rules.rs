//! Per-node field validation (N001–N009).
//! SYNC NOTE: Match arms here must track `GraphNode` in `parse/types.rs`.

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

use super::Issue;
use crate::parse::types::*;
use crate::rules::is_valid_port_spec;

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid regex is valid")
});

pub fn is_uuid(value: &str) -> bool {
    UUID.is_match(value.trim())
}

fn port_in_range(port: u32) -> bool {
    (1..=65535).contains(&port)
}

/// Validate a single node's fields. Returns all issues found.
pub fn validate_node_fields(node: &GraphNode) -> Vec<Issue> {
    let mut issues = Vec::new();
    let node_id = Some(node.id());

    if let Some(tag) = node.tag() {
        if tag.trim().is_empty() {
            issues.push(Issue::error(
                "N001",
                format!("{} node '{}' must have a tag", node.kind(), node.id()),
                node_id,
            ));
        }
    }

    match node {
        GraphNode::Device(_) => {}
        GraphNode::Inbound(n) => {
            let cfg = &n.data;
            if !port_in_range(cfg.port) {
                issues.push(Issue::error(
                    "N002",
                    format!("Inbound '{}' port {} is outside 1-65535", cfg.tag, cfg.port),
                    node_id,
                ));
            }
            let listen = cfg.listen.trim();
            if !listen.is_empty() && listen.parse::<Ipv4Addr>().is_err() {
                issues.push(Issue::error(
                    "N003",
                    format!("Inbound '{}' listen address '{}' is not an IPv4 address", cfg.tag, listen),
                    node_id,
                ));
            }
            validate_users(cfg, node.id(), &mut issues);
        }
        GraphNode::Routing(n) => {
            let predicates = &n.data.predicates;
            if let Some(port) = predicates.port_spec() {
                if !is_valid_port_spec(port) {
                    issues.push(Issue::error(
                        "N006",
                        format!(
                            "Routing '{}' port '{}' must look like 80,443,1000-2000",
                            n.data.tag, port
                        ),
                        node_id,
                    ));
                }
            }
            if let Some(network) = predicates.network_spec() {
                if !matches!(network, "tcp" | "udp" | "tcp,udp") {
                    issues.push(Issue::error(
                        "N009",
                        format!(
                            "Routing '{}' network '{}' must be tcp, udp or tcp,udp",
                            n.data.tag, network
                        ),
                        node_id,
                    ));
                }
            }
        }
        GraphNode::Balancer(_) => {}
        GraphNode::OutboundTerminal(_) => {}
        GraphNode::OutboundProxy(n) => {
            let cfg = &n.data;
            if cfg.server_address.trim().is_empty() {
                issues.push(Issue::error(
                    "N007",
                    format!("Proxy outbound '{}' must have a server address", cfg.tag),
                    node_id,
                ));
            }
            if !port_in_range(cfg.server_port) {
                issues.push(Issue::error(
                    "N008",
                    format!(
                        "Proxy outbound '{}' server port {} is outside 1-65535",
                        cfg.tag, cfg.server_port
                    ),
                    node_id,
                ));
            }
        }
    }

    issues
}

fn validate_users(cfg: &InboundConfig, node_id: &str, issues: &mut Vec<Issue>) {
    match cfg.protocol {
        InboundProtocol::Vless | InboundProtocol::Vmess => {
            for user in &cfg.users {
                let id = user.id.as_deref().unwrap_or("");
                if !is_uuid(id) {
                    issues.push(Issue::error(
                        "N004",
                        format!(
                            "User '{}' on {} inbound '{}' needs a UUID id, got '{}'",
                            user.email,
                            cfg.protocol.as_str(),
                            cfg.tag,
                            id
                        ),
                        Some(node_id),
                    ));
                }
            }
        }
        InboundProtocol::Trojan => {
            for user in &cfg.users {
                if user.password.as_deref().is_none_or(|p| p.is_empty()) {
                    issues.push(Issue::error(
                        "N005",
                        format!(
                            "User '{}' on trojan inbound '{}' needs a password",
                            user.email, cfg.tag
                        ),
                        Some(node_id),
                    ));
                }
            }
        }
        InboundProtocol::Http
        | InboundProtocol::Socks
        | InboundProtocol::Shadowsocks
        | InboundProtocol::DokodemoDoor => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(protocol: InboundProtocol, port: u32, users: Vec<InboundUser>) -> GraphNode {
        GraphNode::Inbound(NodeBase::new(
            "in",
            InboundConfig {
                tag: "in1".into(),
                protocol,
                listen: "0.0.0.0".into(),
                port,
                sniffing: None,
                users,
                method: None,
                transport: None,
            },
        ))
    }

    fn codes(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn uuid_shape() {
        assert!(is_uuid("b831381d-6324-4d53-ad4f-8cda48b30811"));
        assert!(is_uuid("B831381D-6324-4D53-AD4F-8CDA48B30811"));
        assert!(!is_uuid("not-a-uuid"));
        assert!(!is_uuid(""));
    }

    #[test]
    fn inbound_port_out_of_range() {
        let issues = validate_node_fields(&inbound(InboundProtocol::Socks, 0, vec![]));
        assert_eq!(codes(&issues), vec!["N002"]);
        let issues = validate_node_fields(&inbound(InboundProtocol::Socks, 70000, vec![]));
        assert_eq!(codes(&issues), vec!["N002"]);
    }

    #[test]
    fn vless_requires_uuid() {
        let users = vec![InboundUser {
            email: "a@example.com".into(),
            id: Some("nope".into()),
            ..Default::default()
        }];
        let issues = validate_node_fields(&inbound(InboundProtocol::Vless, 443, users));
        assert_eq!(codes(&issues), vec!["N004"]);
    }

    #[test]
    fn trojan_requires_password() {
        let users = vec![InboundUser {
            email: "a@example.com".into(),
            password: Some(String::new()),
            ..Default::default()
        }];
        let issues = validate_node_fields(&inbound(InboundProtocol::Trojan, 443, users));
        assert_eq!(codes(&issues), vec!["N005"]);
    }

    #[test]
    fn listen_must_be_ipv4() {
        let mut node = inbound(InboundProtocol::Http, 8080, vec![]);
        if let GraphNode::Inbound(n) = &mut node {
            n.data.listen = "localhost".into();
        }
        assert_eq!(codes(&validate_node_fields(&node)), vec!["N003"]);
    }

    #[test]
    fn proxy_requires_address_and_port() {
        let node = GraphNode::OutboundProxy(NodeBase::new(
            "p",
            ProxyOutboundConfig {
                tag: "out".into(),
                protocol: ProxyProtocol::Vless,
                server_address: " ".into(),
                server_port: 0,
                id: None,
                password: None,
                method: None,
                transport: None,
            },
        ));
        assert_eq!(codes(&validate_node_fields(&node)), vec!["N007", "N008"]);
    }

    #[test]
    fn empty_tag_flagged() {
        let node = GraphNode::Balancer(NodeBase::new("b", BalancerConfig::default()));
        assert_eq!(codes(&validate_node_fields(&node)), vec!["N001"]);
    }
}
