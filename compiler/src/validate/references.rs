//! Cross-reference checks (R001–R002): tags named inside node configs must exist.

use std::collections::HashSet;

use super::Issue;
use crate::parse::types::GraphNode;
use crate::rules::selector_matches;

pub fn validate_references(nodes: &[GraphNode], issues: &mut Vec<Issue>) {
    let inbound_tags: HashSet<&str> = nodes
        .iter()
        .filter_map(|n| match n {
            GraphNode::Inbound(i) => Some(i.data.tag.as_str()),
            _ => None,
        })
        .collect();
    let outbound_tags: Vec<&str> = nodes
        .iter()
        .filter(|n| n.kind().is_outbound())
        .filter_map(GraphNode::tag)
        .collect();

    for node in nodes {
        match node {
            GraphNode::Routing(n) => {
                if let Some(tag) = n.data.predicates.inbound_tag_spec() {
                    if !inbound_tags.contains(tag) {
                        issues.push(Issue::warning(
                            "R001",
                            format!(
                                "Routing '{}' refers to inbound tag '{}', which does not exist",
                                n.data.tag, tag
                            ),
                            Some(&n.id),
                        ));
                    }
                }
            }
            GraphNode::Balancer(n) => {
                for prefix in n.data.selector.iter().filter(|s| !s.trim().is_empty()) {
                    let selector = std::slice::from_ref(prefix);
                    if !outbound_tags.iter().any(|tag| selector_matches(selector, tag)) {
                        issues.push(Issue::warning(
                            "R002",
                            format!(
                                "Balancer '{}' selector '{}' matches no outbound tag",
                                n.data.tag, prefix
                            ),
                            Some(&n.id),
                        ));
                    }
                }
            }
            GraphNode::Device(_)
            | GraphNode::Inbound(_)
            | GraphNode::OutboundTerminal(_)
            | GraphNode::OutboundProxy(_) => {}
        }
    }
}
