//! Error taxonomy for an upload run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for driveup operations.
///
/// Every variant is fatal for the run: the caller reports the message and
/// exits with a non-zero status.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was empty or absent.
    #[error("missing input '{0}'")]
    MissingInput(String),

    /// The credentials input is not valid base64 (or not UTF-8 once decoded).
    #[error("base64 decoding of 'credentials' failed with error: {0}")]
    CredentialDecode(String),

    /// The decoded credentials are not a usable service-account key.
    #[error("parsing service account credentials failed with error: {0}")]
    CredentialParse(String),

    /// Exchanging the service-account assertion for a token failed.
    #[error("fetching access token failed with error: {0}")]
    Authentication(String),

    /// The local source file could not be opened.
    #[error("opening file with filename: {} failed with error: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote create call failed.
    #[error("creating file: {request} failed with error: {cause}")]
    Upload { request: String, cause: String },

    /// Network or remote API failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingInput(_) => "missing_input",
            Error::CredentialDecode(_) => "credential_decode",
            Error::CredentialParse(_) => "credential_parse",
            Error::Authentication(_) => "authentication",
            Error::FileOpen { .. } => "file_open",
            Error::Upload { .. } => "upload",
            Error::Network(_) => "network",
            Error::InvalidInput(_) => "invalid_input",
            Error::Io(_) => "io",
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
