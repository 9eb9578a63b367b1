//! Deterministic left-to-right placement by node kind.

use crate::parse::types::{GraphNode, NodeKind};

pub const LAYER_SPACING: f64 = 300.0;
pub const ROW_SPACING: f64 = 120.0;

pub fn layer_of(kind: NodeKind) -> usize {
    match kind {
        NodeKind::Device | NodeKind::Inbound => 0,
        NodeKind::Routing => 1,
        NodeKind::Balancer => 2,
        NodeKind::OutboundTerminal | NodeKind::OutboundProxy => 3,
    }
}

/// Each layer is a column; nodes stack in list order.
pub fn auto_layout(nodes: &mut [GraphNode]) {
    let mut rows = [0usize; 4];
    for node in nodes.iter_mut() {
        let layer = layer_of(node.kind());
        let position = node.position_mut();
        position.x = layer as f64 * LAYER_SPACING;
        position.y = rows[layer] as f64 * ROW_SPACING;
        rows[layer] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::*;

    #[test]
    fn layers_and_rows() {
        let routing = |id: &str| {
            GraphNode::Routing(NodeBase::new(
                id,
                RoutingConfig {
                    tag: id.into(),
                    ..Default::default()
                },
            ))
        };
        let mut nodes = vec![
            routing("r1"),
            GraphNode::OutboundTerminal(NodeBase::new(
                "o1",
                TerminalOutboundConfig {
                    tag: "direct".into(),
                    protocol: TerminalProtocol::Freedom,
                },
            )),
            routing("r2"),
        ];
        auto_layout(&mut nodes);
        let positions: Vec<(f64, f64)> = nodes
            .iter_mut()
            .map(|n| {
                let p = n.position_mut();
                (p.x, p.y)
            })
            .collect();
        assert_eq!(positions, vec![(300.0, 0.0), (900.0, 0.0), (300.0, 120.0)]);
    }
}
