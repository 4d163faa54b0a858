//! Error types for whoshome.
//!
//! Every failure that can leave the household controller is one of a small,
//! closed set of kinds (see [`ErrorKind`]) so callers can branch on the kind
//! instead of inspecting message text.

use thiserror::Error;

use crate::store::StoreError;

/// The main error type for whoshome operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    /// A required field was empty after trimming whitespace.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The requested colour is not part of the palette.
    #[error("unknown color '{token}'")]
    UnknownColor {
        /// The colour as it was given.
        token: String,
    },

    // === Roster Errors ===
    /// No member with this id is present in the local roster.
    #[error("member not found: {id}")]
    MemberNotFound {
        /// The id that was looked up.
        id: String,
    },

    // === Remote Errors ===
    /// The remote store failed or could not be reached.
    #[error(transparent)]
    Remote(#[from] StoreError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for whoshome operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input was rejected before any remote call was made.
    Validation,
    /// The referenced member is not in the local roster.
    NotFound,
    /// The remote store failed, timed out, or returned something unreadable.
    RemoteUnavailable,
    /// Configuration could not be loaded or is inconsistent.
    Configuration,
    /// Local I/O or serialization failed.
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::RemoteUnavailable => write!(f, "remote_unavailable"),
            Self::Configuration => write!(f, "configuration"),
            Self::Io => write!(f, "io"),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an empty-field validation error.
    #[must_use]
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    /// Create a member-not-found error.
    #[must_use]
    pub fn member_not_found(id: impl Into<String>) -> Self {
        Self::MemberNotFound { id: id.into() }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyField { .. } | Self::UnknownColor { .. } => ErrorKind::Validation,
            Self::MemberNotFound { .. } => ErrorKind::NotFound,
            Self::Remote(StoreError::Config { .. }) => ErrorKind::Configuration,
            Self::Remote(_) => ErrorKind::RemoteUnavailable,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Configuration,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    /// Check if this error was raised before reaching the store.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this error reports an unknown member.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if the store raised this error. The household has already
    /// notified the user about it.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::empty_field("name");
        assert_eq!(err.to_string(), "name must not be empty");

        let err = Error::member_not_found("abc");
        assert_eq!(err.to_string(), "member not found: abc");
    }

    #[test]
    fn test_validation_kind() {
        assert_eq!(Error::empty_field("role").kind(), ErrorKind::Validation);
        let err = Error::UnknownColor {
            token: "#000000".to_string(),
        };
        assert!(err.is_validation());
        assert!(err.to_string().contains("#000000"));
    }

    #[test]
    fn test_not_found_kind() {
        let err = Error::member_not_found("missing");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_remote_kind() {
        let err: Error = StoreError::unavailable("connection refused").into();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert!(err.to_string().contains("connection refused"));

        let err: Error = StoreError::Rejected {
            status: 409,
            message: "duplicate key".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
    }

    #[test]
    fn test_store_config_is_configuration_kind() {
        let err: Error = StoreError::Config {
            message: "missing url".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.is_remote());
        assert!(!Error::config_validation("bad").is_remote());
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("timeout_secs must be greater than 0");
        assert!(err.to_string().contains("timeout_secs"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Validation.to_string(), "validation");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::RemoteUnavailable.to_string(), "remote_unavailable");
    }
}
