use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LibraryError {
    // The book store could not be read from or written to disk.
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // The external metadata service could not be reached or answered with an error.
    // Timeouts and connection failures are retryable, error statuses may not be.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    // Maps a non-success status of the metadata service
    pub fn from_http_status(message: &str, status: u16) -> LibraryError {
        let reason = Some(status.to_string());
        if status == 404 {
            LibraryError::not_found(
                format!("not found error {} {}", message, status).as_str())
        } else if status == 429 || status >= 500 {
            LibraryError::unavailable(
                format!("metadata service unavailable {} {}", message, status).as_str(), reason, true)
        } else {
            LibraryError::unavailable(
                format!("metadata service error {} {}", message, status).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::database(
            format!("book store io {:?}", err).as_str(), Some(format!("{:?}", err.kind())), false)
    }
}

// Only request payloads decode into Serialization; store and upstream decoding map their own errors.
impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(format!("{}", err).as_str())
    }
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LibraryError::unavailable(
                format!("metadata request timed out {}", err).as_str(), Some("timeout".to_string()), true)
        } else if err.is_connect() {
            LibraryError::unavailable(
                format!("metadata service unreachable {}", err).as_str(), Some("connect".to_string()), true)
        } else if err.is_decode() {
            LibraryError::unavailable(
                format!("undecodable metadata payload {}", err).as_str(), Some("decode".to_string()), false)
        } else if let Some(status) = err.status() {
            LibraryError::from_http_status(format!("{}", err).as_str(), status.as_u16())
        } else {
            LibraryError::unavailable(
                format!("metadata request failed {}", err).as_str(), None, false)
        }
    }
}

impl LibraryError {
    pub fn message(&self) -> &str {
        match self {
            LibraryError::Database { message, .. }
            | LibraryError::DuplicateKey { message }
            | LibraryError::NotFound { message }
            | LibraryError::CurrentlyUnavailable { message, .. }
            | LibraryError::Validation { message, .. }
            | LibraryError::Serialization { message }
            | LibraryError::Runtime { message, .. } => message.as_str(),
        }
    }
}

// Display is what HTTP clients see, so reason codes and retry flags stay out of it.
impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for LibraryError {}

/// A specialized Result type for the catalog.
pub type LibraryResult<T> = Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use crate::core::library::LibraryError;

    #[tokio::test]
    async fn test_should_build_errors_from_constructors() {
        assert!(matches!(LibraryError::database("test", None, false), LibraryError::Database{ .. }));
        assert!(matches!(LibraryError::duplicate_key("test"), LibraryError::DuplicateKey{ .. }));
        assert!(matches!(LibraryError::not_found("test"), LibraryError::NotFound{ .. }));
        assert!(matches!(LibraryError::unavailable("test", None, false), LibraryError::CurrentlyUnavailable{ .. }));
        assert!(matches!(LibraryError::validation("test", None), LibraryError::Validation{ .. }));
        assert!(matches!(LibraryError::serialization("test"), LibraryError::Serialization{ .. }));
        assert!(matches!(LibraryError::runtime("test", None), LibraryError::Runtime{ .. }));
    }

    #[tokio::test]
    async fn test_should_display_message_only() {
        let err = LibraryError::validation("title must not be blank", Some("title".to_string()));
        assert_eq!("title must not be blank", err.to_string());
        let err = LibraryError::unavailable("metadata service down", Some("503".to_string()), true);
        assert_eq!("metadata service down", err.to_string());
    }

    #[tokio::test]
    async fn test_should_map_http_status() {
        assert!(matches!(LibraryError::from_http_status("test", 404), LibraryError::NotFound{ .. }));
        assert!(matches!(LibraryError::from_http_status("test", 503), LibraryError::CurrentlyUnavailable{ retryable: true, .. }));
        assert!(matches!(LibraryError::from_http_status("test", 429), LibraryError::CurrentlyUnavailable{ retryable: true, .. }));
        assert!(matches!(LibraryError::from_http_status("test", 403), LibraryError::CurrentlyUnavailable{ retryable: false, .. }));
    }

    #[tokio::test]
    async fn test_should_map_io_error_to_database() {
        let err = LibraryError::from(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(err, LibraryError::Database{ retryable: false, .. }));
    }

    #[tokio::test]
    async fn test_should_report_retryable() {
        let retryable: Vec<bool> = vec![
            LibraryError::database("test", None, false),
            LibraryError::duplicate_key("test"),
            LibraryError::not_found("test"),
            LibraryError::unavailable("test", None, false),
            LibraryError::unavailable("test", None, true),
            LibraryError::validation("test", None),
            LibraryError::serialization("test"),
            LibraryError::runtime("test", None),
        ].iter().map(LibraryError::retryable).collect();
        assert_eq!(vec![false, false, false, false, true, false, false, false], retryable);
    }
}
