//! Validation engine.
//!
//! Runs on every graph edit, so it never fails: every finding is an `Issue`,
//! and an internal panic degrades to an empty, valid result.

pub mod node_rules;
pub mod references;
pub mod structural;
pub mod transport;

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::parse::graph::TopologyGraph;
use crate::parse::types::{GraphEdge, GraphNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub level: IssueLevel,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
    pub message: String,
}

impl Issue {
    fn new(level: IssueLevel, code: &str, message: impl Into<String>, node_id: Option<&str>) -> Self {
        Issue {
            level,
            code: code.into(),
            node_id: node_id.map(str::to_string),
            edge_id: None,
            message: message.into(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>, node_id: Option<&str>) -> Self {
        Issue::new(IssueLevel::Error, code, message, node_id)
    }

    pub fn warning(code: &str, message: impl Into<String>, node_id: Option<&str>) -> Self {
        Issue::new(IssueLevel::Warning, code, message, node_id)
    }

    pub fn info(code: &str, message: impl Into<String>, node_id: Option<&str>) -> Self {
        Issue::new(IssueLevel::Info, code, message, node_id)
    }

    pub fn on_edge(mut self, edge_id: &str) -> Self {
        self.edge_id = Some(edge_id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub infos: Vec<Issue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        ValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let mut result = ValidationResult::default();
        for issue in issues {
            match issue.level {
                IssueLevel::Error => result.errors.push(issue),
                IssueLevel::Warning => result.warnings.push(issue),
                IssueLevel::Info => result.infos.push(issue),
            }
        }
        result.valid = result.errors.is_empty();
        result
    }

    pub fn all(&self) -> impl Iterator<Item = &Issue> {
        self.errors.iter().chain(&self.warnings).chain(&self.infos)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.all().any(|i| i.code == code)
    }

    /// Issues attached to one node, for inline badges.
    pub fn for_node<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.all()
            .filter(move |i| i.node_id.as_deref() == Some(node_id))
    }
}

/// Validate the whole graph: node fields, cross-group edge transports,
/// structure, then cross-references.
pub fn validate_graph(nodes: &[GraphNode], edges: &[GraphEdge]) -> ValidationResult {
    match panic::catch_unwind(AssertUnwindSafe(|| collect_issues(nodes, edges))) {
        Ok(issues) => {
            let result = ValidationResult::from_issues(issues);
            tracing::debug!(
                errors = result.errors.len(),
                warnings = result.warnings.len(),
                infos = result.infos.len(),
                "validated graph"
            );
            result
        }
        Err(_) => {
            tracing::error!("graph validation panicked; reporting an empty result");
            ValidationResult::default()
        }
    }
}

/// Validate a single node's fields.
pub fn validate_node(node: &GraphNode) -> Vec<Issue> {
    node_rules::validate_node_fields(node)
}

fn collect_issues(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<Issue> {
    let graph = TopologyGraph::build(nodes, edges);
    let mut issues = Vec::new();

    for node in nodes {
        issues.extend(validate_node(node));
    }
    transport::validate_edge_transports(edges, &graph, &mut issues);
    structural::validate_structural(nodes, edges, &graph, &mut issues);
    references::validate_references(nodes, &mut issues);

    issues
}
