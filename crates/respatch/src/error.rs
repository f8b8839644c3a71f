use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No resolution signatures found in {scanned} bytes")]
    NoSignatureMatch { scanned: usize },

    #[error("Pattern '{pattern}' uses unrecognized category '{category}'")]
    UnrecognizedCategory { pattern: String, category: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("External tool {tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if the input simply had nothing to patch
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoSignatureMatch { .. })
    }
}
