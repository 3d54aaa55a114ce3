//! Remote file storage for driveup.
//!
//! This crate provides the typed seam between the upload pipeline and the
//! remote service ([`DriveFiles`], [`DriveConnector`]) and the Google Drive
//! implementation behind it.
//!
//! # Design Principles
//! - Least privilege: the only scope ever requested is `drive.file`
//! - Single shot: one create call per run, no resumable sessions, no retries
//! - Streaming: file bytes are streamed from disk into the request body

pub mod gdrive;
pub mod provider;

pub use gdrive::{DriveClient, ServiceAccountConnector, ServiceAccountKey, UploadEndpoint};
pub use provider::{DriveConnector, DriveFiles, Media, UploadRequest, UploadResult};
