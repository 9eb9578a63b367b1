//! Routing rules and balancers.
//!
//! One rule per (routing node, outgoing edge), routing nodes ordered by how
//! inbounds reach them. `routing → routing` edges emit nothing; the downstream
//! node emits its own rule. Direct inbound edges to an outbound or balancer get
//! an implicit rule keyed by the inbound tag.

use std::collections::{HashMap, HashSet};

use crate::ir::types::{FieldRule, StrategyBlock, XrayBalancer};
use crate::parse::graph::TopologyGraph;
use crate::parse::types::{
    BalancerConfig, BalancerStrategy, GraphEdge, GraphNode, NodeBase, NodeKind, RoutingConfig, RulePredicates,
};
use crate::rules::selector_matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget<'a> {
    Outbound(&'a str),
    Balancer(&'a str),
}

impl<'a> RuleTarget<'a> {
    /// Kind of node an edge lands on, if rules can point at it.
    pub fn of(node: &'a GraphNode) -> Option<Self> {
        match node {
            GraphNode::OutboundTerminal(n) => Some(RuleTarget::Outbound(&n.data.tag)),
            GraphNode::OutboundProxy(n) => Some(RuleTarget::Outbound(&n.data.tag)),
            GraphNode::Balancer(n) => Some(RuleTarget::Balancer(&n.data.tag)),
            GraphNode::Device(_) | GraphNode::Inbound(_) | GraphNode::Routing(_) => None,
        }
    }
}

pub fn field_rule(predicates: &RulePredicates, target: RuleTarget<'_>) -> FieldRule {
    let list = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
    let (outbound_tag, balancer_tag) = match target {
        RuleTarget::Outbound(tag) => (Some(tag.to_string()), None),
        RuleTarget::Balancer(tag) => (None, Some(tag.to_string())),
    };

    FieldRule {
        rule_type: "field".into(),
        rule_tag: None,
        inbound_tag: predicates.inbound_tag_spec().map(|t| vec![t.to_string()]),
        domain: list(&predicates.domain),
        ip: list(&predicates.ip),
        port: predicates.port_spec().map(str::to_string),
        network: predicates.network_spec().map(str::to_string),
        protocol: list(&predicates.protocol),
        outbound_tag,
        balancer_tag,
    }
}

/// Routing nodes an inbound reaches directly come first, ranked by their best
/// inbound edge (priority, then edge order), which is the order the simulator
/// tries them in. Routing nodes no inbound reaches follow in node order, then
/// the implicit inbound rules.
pub fn lower_rules(nodes: &[GraphNode], edges: &[GraphEdge], graph: &TopologyGraph<'_>) -> Vec<FieldRule> {
    let mut entry_rank: HashMap<&str, (u32, usize)> = HashMap::new();
    for (position, edge) in edges.iter().enumerate() {
        let from_inbound = graph.source_of(edge).is_some_and(|n| n.kind() == NodeKind::Inbound);
        let to_routing = graph.target_of(edge).is_some_and(|n| n.kind() == NodeKind::Routing);
        if from_inbound && to_routing {
            let rank = (edge.priority(), position);
            entry_rank
                .entry(edge.target.as_str())
                .and_modify(|best| *best = (*best).min(rank))
                .or_insert(rank);
        }
    }

    let mut routing_nodes: Vec<&NodeBase<RoutingConfig>> = nodes
        .iter()
        .filter_map(|n| match n {
            GraphNode::Routing(r) => Some(r),
            _ => None,
        })
        .collect();
    routing_nodes.sort_by_key(|r| match entry_rank.get(r.id.as_str()) {
        Some(rank) => (false, *rank),
        None => (true, (0, 0)),
    });

    let mut emitted = HashSet::new();
    let mut rules = Vec::new();
    for routing in routing_nodes {
        if !emitted.insert(routing.id.as_str()) {
            continue;
        }
        for edge in graph.outgoing(&routing.id) {
            if let Some(target) = graph.target_of(edge).and_then(RuleTarget::of) {
                rules.push(field_rule(&routing.data.predicates, target));
            }
        }
    }

    for node in nodes {
        let GraphNode::Inbound(inbound) = node else {
            continue;
        };
        for edge in graph.outgoing(&inbound.id) {
            if let Some(target) = graph.target_of(edge).and_then(RuleTarget::of) {
                let implicit = RulePredicates {
                    inbound_tag: Some(inbound.data.tag.clone()),
                    ..Default::default()
                };
                rules.push(field_rule(&implicit, target));
            }
        }
    }

    rules
}

pub fn lower_balancer(id: &str, config: &BalancerConfig, graph: &TopologyGraph<'_>) -> XrayBalancer {
    let mut selector: Vec<String> = config
        .selector
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    for edge in graph.outgoing(id) {
        let Some(RuleTarget::Outbound(tag)) = graph.target_of(edge).and_then(RuleTarget::of) else {
            continue;
        };
        if !selector_matches(&selector, tag) {
            selector.push(tag.to_string());
        }
    }

    XrayBalancer {
        tag: config.tag.clone(),
        selector,
        strategy: match config.strategy {
            BalancerStrategy::Random => None,
            other => Some(StrategyBlock {
                strategy_type: other.as_str().to_string(),
            }),
        },
    }
}
