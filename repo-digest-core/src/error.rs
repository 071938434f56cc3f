use thiserror::Error;

/// Result type for source enumeration and digest building
pub type Result<T> = std::result::Result<T, SourceError>;

/// Archive-level failures. Every variant is fatal to the whole run: no partial
/// digest is produced once one of these is returned.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The zip file, directory or remote archive does not exist
    #[error("Failed to find the source at {location}. Please check the path and try again.")]
    NotFound { location: String },

    /// The source exists but cannot be read as a repository (corrupt zip, not a directory)
    #[error("The source at {location} is not valid: {reason}. Please check the file and try again.")]
    Invalid { location: String, reason: String },

    /// The remote archive could not be fetched within the retry budget
    #[error("Could not reach {url} after {attempts} attempt(s): {reason}")]
    Unreachable {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// The blocking enumeration task panicked or was aborted
    #[error("Source enumeration task failed: {0}")]
    Task(String),

    /// Enumeration was cancelled by the caller
    #[error("Source enumeration was cancelled")]
    Cancelled,

    /// A file inside a directory source could not be read
    #[error("IO error while reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Create a not-found error
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    /// Create an invalid-archive error
    pub fn invalid(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an IO error bound to the path being read
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
