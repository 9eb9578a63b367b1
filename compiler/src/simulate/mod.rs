//! Traffic simulator: walks the graph the way the compiled rules would route
//! a single request, and records the path for highlighting.
//!
//! Never fails. Cycles, dead ends and unmatched requests come back as
//! `success: false` with an explanation.

pub mod strategy;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::parse::graph::TopologyGraph;
use crate::parse::types::{GraphEdge, GraphNode, NodeKind};
use crate::rules::{RuleSubject, predicates_match, selector_matches};

pub use strategy::{BalancerPicker, FirstPicker, RandomPicker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub inbound_tag: String,
}

fn default_protocol() -> String {
    "tcp".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub node_id: String,
    pub tag: String,
    pub node_type: NodeKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub success: bool,
    pub path: Vec<Step>,
    pub highlight_node_ids: Vec<String>,
    pub highlight_edge_ids: Vec<String>,
    pub final_outbound: Option<String>,
    pub explanation: String,
}

pub fn run_simulation(request: &SimulationRequest, nodes: &[GraphNode], edges: &[GraphEdge]) -> SimulationResult {
    run_simulation_with(request, nodes, edges, &mut RandomPicker::new())
}

pub fn run_simulation_with(
    request: &SimulationRequest,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    picker: &mut dyn BalancerPicker,
) -> SimulationResult {
    let graph = TopologyGraph::build(nodes, edges);
    let mut walk = Walk::default();

    let start = nodes
        .iter()
        .find(|n| matches!(n, GraphNode::Inbound(i) if i.data.tag == request.inbound_tag));
    let Some(start) = start else {
        return walk.fail(format!("No inbound with tag '{}'", request.inbound_tag));
    };

    let mut current = start;
    let mut visited = HashSet::new();

    let result = loop {
        if !visited.insert(current.id()) {
            walk.step(current, "Revisited this node".into());
            break walk.fail(format!("Cycle detected at '{}'", current.display_name()));
        }
        walk.highlight_node_ids.push(current.id().to_string());

        let outgoing = graph.outgoing(current.id());
        let next: &GraphEdge = match current {
            GraphNode::Inbound(inbound) => {
                let inbound_tag = inbound.data.tag.as_str();
                if outgoing.is_empty() {
                    walk.step(current, "Inbound has no outgoing connections".into());
                    break walk.dead_end(current);
                }
                let subject = RuleSubject {
                    domain: &request.domain,
                    protocol: &request.protocol,
                    port: request.port,
                    inbound_tag,
                };
                let matched = outgoing.iter().find(|e| match graph.target_of(e) {
                    Some(GraphNode::Routing(r)) => predicates_match(&r.data.predicates, &subject),
                    _ => false,
                });
                let fallback = || {
                    outgoing
                        .iter()
                        .find(|e| graph.target_of(e).is_some_and(|t| t.kind() != NodeKind::Routing))
                };
                match (matched, fallback()) {
                    (Some(edge), _) => {
                        let rule = graph.target_of(edge).map(GraphNode::display_name).unwrap_or_default();
                        walk.step(current, format!("Accepted on inbound; rule '{}' matched", rule));
                        *edge
                    }
                    (None, Some(edge)) => {
                        walk.step(current, "Accepted on inbound; no rule matched, using direct connection".into());
                        *edge
                    }
                    (None, None) => {
                        walk.step(current, "Accepted on inbound; no rule matched".into());
                        break walk.fail(format!(
                            "No routing rule matched the request for '{}' at inbound '{}'",
                            request.domain, inbound_tag
                        ));
                    }
                }
            }
            GraphNode::Routing(_) => {
                let Some(edge) = outgoing.first() else {
                    walk.step(current, "Rule matched but leads nowhere".into());
                    break walk.dead_end(current);
                };
                walk.step(current, "Rule matched".into());
                *edge
            }
            GraphNode::Balancer(balancer) => {
                if outgoing.is_empty() {
                    walk.step(current, "Balancer has no targets".into());
                    break walk.dead_end(current);
                }
                let declared = balancer.data.selector.iter().any(|s| !s.trim().is_empty());
                let candidates: Vec<&&GraphEdge> = outgoing
                    .iter()
                    .filter(|e| {
                        !declared
                            || graph
                                .target_of(e)
                                .and_then(GraphNode::tag)
                                .is_some_and(|t| selector_matches(&balancer.data.selector, t))
                    })
                    .collect();
                if candidates.is_empty() {
                    walk.step(current, "Selector matched no target; using first connection".into());
                    outgoing[0]
                } else {
                    let i = strategy::choose(balancer.data.strategy, candidates.len(), picker);
                    walk.step(
                        current,
                        format!(
                            "Balancer ({}) picked {} of {} candidates",
                            balancer.data.strategy.as_str(),
                            i + 1,
                            candidates.len()
                        ),
                    );
                    *candidates[i]
                }
            }
            GraphNode::OutboundProxy(proxy) => {
                let hop = outgoing
                    .iter()
                    .find(|e| graph.target_of(e).is_some_and(|t| t.kind() == NodeKind::Inbound));
                match hop {
                    Some(edge) => {
                        walk.step(current, "Forwarded to the next server".into());
                        *edge
                    }
                    None => {
                        walk.step(current, "Leaves through proxy".into());
                        break walk.succeed(&proxy.data.tag, request);
                    }
                }
            }
            GraphNode::OutboundTerminal(terminal) => {
                walk.step(current, format!("Handled by {}", terminal.data.protocol.as_str()));
                break walk.succeed(&terminal.data.tag, request);
            }
            GraphNode::Device(_) => {
                walk.step(current, "Devices do not route traffic".into());
                break walk.dead_end(current);
            }
        };

        let Some(target) = graph.target_of(next) else {
            break walk.dead_end(current);
        };
        walk.highlight_edge_ids.push(next.id.clone());
        current = target;
    };

    tracing::debug!(
        success = result.success,
        steps = result.path.len(),
        "simulated request"
    );
    result
}

#[derive(Default)]
struct Walk {
    path: Vec<Step>,
    highlight_node_ids: Vec<String>,
    highlight_edge_ids: Vec<String>,
}

impl Walk {
    fn step(&mut self, node: &GraphNode, description: String) {
        self.path.push(Step {
            node_id: node.id().to_string(),
            tag: node.tag().unwrap_or_default().to_string(),
            node_type: node.kind(),
            description,
        });
    }

    fn finish(&mut self, success: bool, final_outbound: Option<String>, explanation: String) -> SimulationResult {
        SimulationResult {
            success,
            path: std::mem::take(&mut self.path),
            highlight_node_ids: std::mem::take(&mut self.highlight_node_ids),
            highlight_edge_ids: std::mem::take(&mut self.highlight_edge_ids),
            final_outbound,
            explanation,
        }
    }

    fn fail(&mut self, explanation: String) -> SimulationResult {
        self.finish(false, None, explanation)
    }

    fn dead_end(&mut self, node: &GraphNode) -> SimulationResult {
        self.fail(format!("Dead end: '{}' has no outgoing connections", node.display_name()))
    }

    fn succeed(&mut self, tag: &str, request: &SimulationRequest) -> SimulationResult {
        self.finish(
            true,
            Some(tag.to_string()),
            format!("'{}' is routed to outbound '{}'", request.domain, tag),
        )
    }
}
