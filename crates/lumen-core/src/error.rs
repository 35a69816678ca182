//! Error types for Lumen

use thiserror::Error;

/// The main error type for Lumen operations
#[derive(Debug, Error)]
pub enum LumenError {
    #[error("Graphics context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Capability query failed: {0}")]
    CapabilityQuery(String),

    #[error("Unknown performance tier: {0}")]
    UnknownTier(String),

    #[error("Invalid LOD levels: {0}")]
    InvalidLod(String),

    #[error("Scene node not found: {0}")]
    NodeNotFound(u32),

    #[error("Failed to dispose {kind} {id}: {reason}")]
    DisposeFailed {
        kind: String,
        id: u64,
        reason: String,
    },

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Lumen operations
pub type Result<T> = std::result::Result<T, LumenError>;

impl From<toml::de::Error> for LumenError {
    fn from(err: toml::de::Error) -> Self {
        LumenError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for LumenError {
    fn from(err: toml::ser::Error) -> Self {
        LumenError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: LumenError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, LumenError::TomlParseError(_)));
    }

    #[test]
    fn dispose_error_message_names_resource() {
        let err = LumenError::DisposeFailed {
            kind: "geometry".into(),
            id: 7,
            reason: "device lost".into(),
        };
        assert_eq!(err.to_string(), "Failed to dispose geometry 7: device lost");
    }
}
