//! Google Drive backend.
//!
//! - Service-account JWT-bearer authentication scoped to `drive.file`
//! - Multipart `files.create` with the file streamed from disk

pub mod auth;
pub mod client;

pub use auth::{
    AuthorizedClient, ServiceAccountAuthenticator, ServiceAccountKey, DRIVE_FILE_SCOPE,
};
pub use client::{DriveClient, ServiceAccountConnector, UploadEndpoint};
