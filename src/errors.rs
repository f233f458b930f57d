/*!
 * Error types for the epub-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors raised while building a glossary
#[derive(Error, Debug)]
pub enum GlossaryError {
    /// The term matcher could not be compiled
    #[error("Failed to compile glossary matcher: {0}")]
    Pattern(#[from] regex::Error),

    /// A glossary file could not be read
    #[error("Failed to read glossary file {path}: {message}")]
    File {
        /// Path of the offending file
        path: String,
        /// What went wrong
        message: String,
    },
}

/// Errors raised by the batch pipeline while translating one document
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The batch size is not a positive integer
    #[error("Invalid batch size {0}: must be a positive integer")]
    InvalidBatchSize(usize),

    /// The translation backend failed for a batch
    #[error("Translation backend failed on batch {batch_index} ({completed_positions} positions written before the failure): {source}")]
    Backend {
        /// Zero-based index of the failing batch
        batch_index: usize,
        /// Positions written by earlier, successful batches
        completed_positions: usize,
        /// The backend error
        #[source]
        source: ProviderError,
    },

    /// The backend returned a different number of translations than submitted
    #[error("Backend contract violated on batch {batch_index}: submitted {expected} texts, received {actual} ({completed_positions} positions written before the failure)")]
    ContractViolation {
        /// Zero-based index of the failing batch
        batch_index: usize,
        /// Number of texts submitted
        expected: usize,
        /// Number of translations returned
        actual: usize,
        /// Positions written by earlier, successful batches
        completed_positions: usize,
    },
}

impl PipelineError {
    /// Index of the batch that failed, if the error happened during processing
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            Self::InvalidBatchSize(_) => None,
            Self::Backend { batch_index, .. } | Self::ContractViolation { batch_index, .. } => {
                Some(*batch_index)
            }
        }
    }

    /// Number of positions already written when the error happened
    pub fn completed_positions(&self) -> usize {
        match self {
            Self::InvalidBatchSize(_) => 0,
            Self::Backend { completed_positions, .. }
            | Self::ContractViolation { completed_positions, .. } => *completed_positions,
        }
    }
}

/// Errors that can occur while reading or writing an EPUB package
#[derive(Error, Debug)]
pub enum EpubError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ZIP container could not be read or written
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An XML document inside the package is malformed
    #[error("Malformed XML in {part} at byte {position}: {message}")]
    Xml {
        /// Package path of the document
        part: String,
        /// Byte offset where parsing failed
        position: usize,
        /// Parser message
        message: String,
    },

    /// A required entry is missing from the package
    #[error("Missing entry in EPUB package: {0}")]
    MissingEntry(String),

    /// The package structure is invalid
    #[error("Invalid EPUB package: {0}")]
    InvalidPackage(String),
}

/// Errors that can occur while translating a book
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the EPUB container
    #[error("EPUB error: {0}")]
    Epub(#[from] EpubError),

    /// A document part could not be translated
    #[error("Failed to translate document part '{part}': {source}")]
    Part {
        /// Package path of the document part
        part: String,
        /// The pipeline failure
        #[source]
        source: PipelineError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the glossary
    #[error("Glossary error: {0}")]
    Glossary(#[from] GlossaryError),

    /// Error from the batch pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
