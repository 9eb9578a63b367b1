//! Parse phase: editor JSON → Rust types + graph construction.

pub mod graph;
pub mod types;

pub use graph::TopologyGraph;
pub use types::*;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CompilerError;

/// Deserialize a topology JSON string (`{nodes, edges, servers}`).
pub fn parse(json: &str) -> Result<Topology, Vec<CompilerError>> {
    serde_json::from_str::<Topology>(json).map_err(|e| {
        let error = CompilerError::parse("P001", format!("Failed to parse topology JSON: {}", e));
        vec![error.at_node(failing_node::<GraphNode>(json))]
    })
}

/// Deserialize a simple-mode graph JSON string.
pub fn parse_simple(json: &str) -> Result<SimpleGraph, Vec<CompilerError>> {
    serde_json::from_str::<SimpleGraph>(json).map_err(|e| {
        let error = CompilerError::parse("P002", format!("Failed to parse simple-mode graph JSON: {}", e));
        vec![error.at_node(failing_node::<SimpleNode>(json))]
    })
}

/// Id of the first `nodes` entry that does not deserialize as `N`.
fn failing_node<N: DeserializeOwned>(json: &str) -> Option<String> {
    let doc: Value = serde_json::from_str(json).ok()?;
    doc.get("nodes")?
        .as_array()?
        .iter()
        .find(|n| serde_json::from_value::<N>((*n).clone()).is_err())
        .and_then(|n| n.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
