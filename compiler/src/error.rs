//! Error types: phase-tagged compiler errors and reverse-compiler failures.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Import,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Import => write!(f, "Import"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn at_node(mut self, node_id: Option<String>) -> Self {
        self.node_id = node_id;
        self
    }
}

/// Reverse-compiler failure: there is no usable input to build a graph from.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to parse configuration JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Configuration must be a JSON object")]
    NotAnObject,
    #[error("Configuration has neither an `inbounds` nor an `outbounds` section")]
    MissingSections,
    #[error("Invalid project file: {0}")]
    InvalidProject(String),
}

impl ImportError {
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::InvalidJson(_) => "I001",
            ImportError::NotAnObject => "I002",
            ImportError::MissingSections => "I003",
            ImportError::InvalidProject(_) => "I004",
        }
    }
}

impl From<ImportError> for CompilerError {
    fn from(e: ImportError) -> Self {
        CompilerError {
            code: e.code().into(),
            phase: Phase::Import,
            message: e.to_string(),
            node_id: None,
        }
    }
}
