// Typed errors with thiserror. Surface meaningful messages to JS.
// Metric functions are total; these only arise at the boundary.

use thiserror::Error;

/// Archivist error types.
#[derive(Error, Debug)]
pub enum ArchivistError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid stroke {stroke_index}: {message}")]
    InvalidStroke { stroke_index: usize, message: String },

    #[error("Nothing to seal: no strokes were drawn")]
    EmptySignature,

    #[error("Corrupt persisted entry '{key}': {message}")]
    Persistence { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ArchivistError {
    fn from(err: serde_json::Error) -> Self {
        ArchivistError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_error_names_key() {
        let err = ArchivistError::Persistence {
            key: "signature_history".to_string(),
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Corrupt persisted entry 'signature_history': expected value"
        );
    }

    #[test]
    fn json_errors_become_serialization() {
        let err: ArchivistError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ArchivistError::Serialization(_)));
    }

    #[test]
    fn stroke_error_names_index() {
        let err = ArchivistError::InvalidStroke {
            stroke_index: 2,
            message: "non-finite coordinate".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid stroke 2: non-finite coordinate");
    }
}
