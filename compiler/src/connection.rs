//! Connection rules: which node kinds may be linked by an edge.
//!
//! Consulted by the editor before it creates an edge, and again by structural
//! validation for graphs that arrive from elsewhere.

use serde::{Deserialize, Serialize};

use crate::parse::types::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConnectionCheck {
    fn ok() -> Self {
        ConnectionCheck {
            valid: true,
            reason: None,
        }
    }

    fn rejected(reason: String) -> Self {
        ConnectionCheck {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Legal target kinds per source kind.
pub fn allowed_targets(source: NodeKind) -> &'static [NodeKind] {
    use NodeKind::*;
    match source {
        Device => &[Inbound, OutboundProxy],
        Inbound => &[Routing, Balancer, OutboundTerminal, OutboundProxy],
        Routing => &[Routing, Balancer, OutboundTerminal, OutboundProxy],
        Balancer => &[OutboundTerminal, OutboundProxy],
        OutboundProxy => &[Inbound],
        OutboundTerminal => &[],
    }
}

pub fn is_valid_connection(source: NodeKind, target: NodeKind) -> ConnectionCheck {
    if source == NodeKind::OutboundTerminal {
        return ConnectionCheck::rejected(
            "Terminal outbounds cannot have outgoing connections".into(),
        );
    }

    let allowed = allowed_targets(source);
    if allowed.contains(&target) {
        return ConnectionCheck::ok();
    }

    let expected: Vec<&str> = allowed.iter().map(NodeKind::as_str).collect();
    ConnectionCheck::rejected(format!(
        "Cannot connect {} to {} (allowed targets: {})",
        source,
        target,
        expected.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_is_source_forbidden() {
        for target in [NodeKind::Inbound, NodeKind::Routing, NodeKind::OutboundProxy] {
            let check = is_valid_connection(NodeKind::OutboundTerminal, target);
            assert!(!check.valid);
            assert!(check.reason.unwrap().contains("Terminal outbounds"));
        }
    }

    #[test]
    fn adjacency_table() {
        assert!(is_valid_connection(NodeKind::Device, NodeKind::Inbound).valid);
        assert!(is_valid_connection(NodeKind::Device, NodeKind::OutboundProxy).valid);
        assert!(!is_valid_connection(NodeKind::Device, NodeKind::Routing).valid);
        assert!(is_valid_connection(NodeKind::Routing, NodeKind::Routing).valid);
        assert!(!is_valid_connection(NodeKind::Balancer, NodeKind::Routing).valid);
        assert!(is_valid_connection(NodeKind::OutboundProxy, NodeKind::Inbound).valid);
        assert!(!is_valid_connection(NodeKind::OutboundProxy, NodeKind::OutboundTerminal).valid);
        assert!(!is_valid_connection(NodeKind::Inbound, NodeKind::Inbound).valid);
    }

    #[test]
    fn rejection_lists_allowed_targets() {
        let check = is_valid_connection(NodeKind::Balancer, NodeKind::Inbound);
        assert_eq!(
            check.reason.as_deref(),
            Some("Cannot connect balancer to inbound (allowed targets: outbound-terminal, outbound-proxy)")
        );
    }
}
