//! Error types for pbixtrans

use std::path::PathBuf;
use thiserror::Error;

/// Broad failure classes surfaced to callers.
///
/// Every [`PbixError`] variant belongs to exactly one kind; the CLI and the
/// tests reason about kinds rather than individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input package or an internal member is missing.
    NotFound,
    /// Input is not a package (wrong extension or unreadable archive).
    Format,
    /// Layout bytes are not UTF-16LE JSON.
    Parse,
    /// Filesystem or archive write failure.
    Io,
    /// The translation provider failed.
    Translation,
    /// Invalid arguments or configuration.
    Config,
}

/// pbixtrans error types
#[derive(Debug, Error)]
pub enum PbixError {
    /// Package file does not exist.
    #[error("Package not found: {}", .0.display())]
    PackageNotFound(PathBuf),
    /// A required member is missing from the package or extracted tree.
    #[error("Member '{member}' not found in {}", .container.display())]
    MemberNotFound {
        /// Member path relative to the package root
        member: String,
        /// Package file or extraction directory that was searched
        container: PathBuf,
    },
    /// Package path does not carry the `.pbix` extension.
    #[error("Invalid file extension for PBIX: '{}'. Expected a .pbix file.", .0.display())]
    UnsupportedExtension(PathBuf),
    /// The package could not be read as a ZIP archive.
    #[error("Invalid package archive: {0}")]
    InvalidArchive(String),
    /// An archive member would be written outside the extraction directory.
    #[error("Unsafe archive entry path: {0}")]
    UnsafeEntryPath(String),
    /// Layout bytes are not valid UTF-16LE text.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The translation provider failed.
    #[error("Translation failed: {0}")]
    Translation(#[from] TranslationError),
    /// Target language code is malformed.
    #[error("Invalid language code '{code}': {reason}")]
    InvalidLanguage {
        /// Code as supplied by the caller
        code: String,
        /// Why the code was rejected
        reason: String,
    },
    /// A visual handler was registered twice for the same tag.
    #[error("Visual handler already registered for '{0}'")]
    HandlerAlreadyRegistered(String),
    /// Configuration file or provider settings are invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PbixError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PbixError::PackageNotFound(_) | PbixError::MemberNotFound { .. } => ErrorKind::NotFound,
            PbixError::UnsupportedExtension(_)
            | PbixError::InvalidArchive(_)
            | PbixError::UnsafeEntryPath(_) => ErrorKind::Format,
            PbixError::InvalidEncoding(_) | PbixError::Json(_) => ErrorKind::Parse,
            PbixError::Io(_) => ErrorKind::Io,
            PbixError::Translation(_) => ErrorKind::Translation,
            PbixError::InvalidLanguage { .. }
            | PbixError::HandlerAlreadyRegistered(_)
            | PbixError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Failures reported by a translation provider.
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    /// The provider could not be reached.
    #[error("Network error: {0}")]
    Network(String),
    /// The provider answered with a non-success HTTP status.
    #[error("Provider returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },
    /// The provider answered but the payload could not be understood.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// The provider cannot translate this input.
    #[error("Unsupported translation: {0}")]
    Unsupported(String),
    /// Every retry attempt failed.
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error returned by the final attempt
        last: Box<TranslationError>,
    },
}

impl TranslationError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Network(_) => true,
            TranslationError::Http { status, .. } => *status == 429 || *status >= 500,
            TranslationError::InvalidResponse(_) => false,
            TranslationError::Unsupported(_) => false,
            TranslationError::RetriesExhausted { .. } => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PbixError>;
