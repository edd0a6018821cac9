//! Error types for draft streaming and chat transports

use thiserror::Error;

/// Description fragment Telegram returns when an edit carries identical content.
const NOT_MODIFIED_MARKER: &str = "message is not modified";

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("message is not modified")]
    NotModified,

    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether the backend rejected an edit only because the content is unchanged.
    pub fn is_not_modified(&self) -> bool {
        match self {
            Self::NotModified => true,
            Self::Api { description, .. } => is_not_modified_description(description),
            Self::Status { body, .. } => is_not_modified_description(body),
            _ => false,
        }
    }
}

/// Check a raw backend error description for the "not modified" rejection.
pub fn is_not_modified_description(description: &str) -> bool {
    description.to_lowercase().contains(NOT_MODIFIED_MARKER)
}

/// Draft streaming error types
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Draft stream already stopped")]
    Stopped,

    #[error("Draft engine task is no longer running")]
    EngineGone,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for draft operations
pub type Result<T> = std::result::Result<T, DraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_modified_variant() {
        assert!(TransportError::NotModified.is_not_modified());
    }

    #[test]
    fn test_not_modified_from_api_description() {
        let err = TransportError::Api {
            code: 400,
            description: "Bad Request: message is not modified: specified new message content \
                          and reply markup are exactly the same"
                .to_string(),
        };
        assert!(err.is_not_modified());
    }

    #[test]
    fn test_other_api_errors_are_not_benign() {
        let err = TransportError::Api {
            code: 400,
            description: "Bad Request: message to edit not found".to_string(),
        };
        assert!(!err.is_not_modified());

        let err = TransportError::InvalidResponse("missing result".to_string());
        assert!(!err.is_not_modified());
    }

    #[test]
    fn test_draft_error_wraps_transport() {
        let err: DraftError = TransportError::NotModified.into();
        assert!(matches!(err, DraftError::Transport(TransportError::NotModified)));
        assert_eq!(err.to_string(), "message is not modified");
    }
}
