//! Error type shared by the scanner, reference store and editor binding.

/// MentionCore errors
#[derive(Debug, Clone, PartialEq)]
pub enum MentionError {
    /// Metadata payload could not be parsed into reference lists
    MetadataParse(String),
    /// Editor configuration rejected
    Config(String),
    /// Mention or view-model serialization failed
    Serialization(String),
    /// Caret or range outside the plain-text projection
    InvalidPosition { pos: usize, len: usize },
}

impl std::fmt::Display for MentionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MentionError::MetadataParse(msg) => write!(f, "Metadata parse error: {}", msg),
            MentionError::Config(msg) => write!(f, "Invalid editor config: {}", msg),
            MentionError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            MentionError::InvalidPosition { pos, len } => {
                write!(f, "Position {} out of bounds (text length {})", pos, len)
            }
        }
    }
}

impl std::error::Error for MentionError {}

impl From<serde_json::Error> for MentionError {
    fn from(e: serde_json::Error) -> Self {
        MentionError::Serialization(e.to_string())
    }
}
