//! Codegen pass: compiled documents → files on disk.
//!
//! Public API: `render_files(results) -> Vec<GeneratedFile>`

use crate::lower::ExportResult;

/// A generated file with its path and content.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Pretty-printed JSON with a trailing newline, one file per document.
pub fn render_files(results: &[ExportResult]) -> Result<Vec<GeneratedFile>, serde_json::Error> {
    results
        .iter()
        .map(|r| {
            let mut content = serde_json::to_string_pretty(&r.config)?;
            content.push('\n');
            Ok(GeneratedFile {
                path: r.filename.clone(),
                content,
            })
        })
        .collect()
}
