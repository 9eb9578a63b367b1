//! Import of the tool's own project envelope.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::detect_mode;
use crate::error::ImportError;
use crate::parse::types::{GraphNode, Project, ProjectMetadata, ProjectMode};

pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_NAME: &str = "Imported Project";

/// Passes the envelope through, filling in a missing version, name, mode or
/// update timestamp.
pub fn import_project(json: &str) -> Result<Project, ImportError> {
    let doc: Value = serde_json::from_str(json)?;
    let root = doc.as_object().ok_or(ImportError::NotAnObject)?;
    if !root.contains_key("nodes") {
        return Err(ImportError::InvalidProject("missing `nodes`".into()));
    }

    let nodes: Vec<GraphNode> = section(root, "nodes")?;
    let mode = match root.get("mode").and_then(Value::as_str) {
        Some("simple") => ProjectMode::Simple,
        Some("infrastructure") => ProjectMode::Infrastructure,
        _ => detect_mode(&nodes),
    };

    let mut metadata: ProjectMetadata = section(root, "metadata")?;
    if metadata.updated_at.is_empty() {
        metadata.updated_at = metadata.created_at.clone();
    }

    Ok(Project {
        version: text(root, "version").unwrap_or_else(|| DEFAULT_VERSION.into()),
        name: text(root, "name").unwrap_or_else(|| DEFAULT_NAME.into()),
        mode,
        servers: section(root, "servers")?,
        nodes,
        edges: section(root, "edges")?,
        metadata,
    })
}

fn text(root: &Map<String, Value>, key: &str) -> Option<String> {
    root.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Absent or null sections default; malformed ones are an error.
fn section<T: DeserializeOwned + Default>(root: &Map<String, Value>, key: &str) -> Result<T, ImportError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ImportError::InvalidProject(format!("`{}`: {}", key, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_defaults() {
        let project = import_project(r#"{"nodes": [], "metadata": {"createdAt": "2024-01-01T00:00:00Z"}}"#).unwrap();
        assert_eq!(project.version, "1.0");
        assert_eq!(project.name, "Imported Project");
        assert_eq!(project.mode, ProjectMode::Simple);
        assert_eq!(project.metadata.updated_at, "2024-01-01T00:00:00Z");
        assert!(project.servers.is_empty());
    }

    #[test]
    fn malformed_sections_are_rejected() {
        let err = import_project(r#"{"nodes": [{"nodeType": "spaceship"}]}"#).unwrap_err();
        assert_eq!(err.code(), "I004");
        let err = import_project(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, ImportError::InvalidProject(_)));
    }

    #[test]
    fn missing_mode_is_detected_from_nodes() {
        let json = r#"{
            "nodes": [
                {"id": "a", "nodeType": "inbound", "position": {"x": 0, "y": 0},
                 "data": {"tag": "a-in", "protocol": "socks", "port": 1080}},
                {"id": "b", "nodeType": "inbound", "position": {"x": 0, "y": 0},
                 "data": {"tag": "b-in", "protocol": "vless", "port": 443}},
                {"id": "p", "nodeType": "outbound-proxy", "position": {"x": 0, "y": 0},
                 "data": {"tag": "out", "protocol": "vless", "serverAddress": "203.0.113.7", "serverPort": 443}}
            ]
        }"#;
        let project = import_project(json).unwrap();
        assert_eq!(project.nodes.len(), 3);
        assert_eq!(project.mode, ProjectMode::Infrastructure);
    }
}
