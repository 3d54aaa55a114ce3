//! Remote file service trait definitions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use driveup_common::{Error, FileId, FolderId, Result, SecretSet};

use crate::gdrive::ServiceAccountKey;

/// MIME type sent for the media part; the service sniffs the real type.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Metadata of the file to create.
///
/// Immutable once built: one name, one parent folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    name: String,
    parents: Vec<FolderId>,
}

impl UploadRequest {
    /// Build a request placing `name` inside `folder`.
    pub fn new(name: impl Into<String>, folder: FolderId) -> Self {
        Self {
            name: name.into(),
            parents: vec![folder],
        }
    }

    /// Destination display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent folders (always exactly one).
    pub fn parents(&self) -> &[FolderId] {
        &self.parents
    }
}

impl fmt::Display for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parents: Vec<&str> = self.parents.iter().map(|p| p.as_str()).collect();
        write!(f, "{{name: {}, parents: [{}]}}", self.name, parents.join(", "))
    }
}

/// File metadata returned by a successful create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Identifier assigned by the service.
    pub id: FileId,
    /// Link for opening the file in a browser.
    #[serde(default)]
    pub web_view_link: Option<String>,
    /// Link for downloading the file content.
    #[serde(default)]
    pub web_content_link: Option<String>,
    /// Export links for native document types, keyed by MIME type.
    #[serde(default)]
    pub export_links: Option<BTreeMap<String, String>>,
}

impl UploadResult {
    /// Shareable viewer link for the uploaded file.
    pub fn view_link(&self) -> String {
        self.id.view_link()
    }
}

/// An opened local file ready to be streamed as an upload body.
#[derive(Debug)]
pub struct Media {
    path: PathBuf,
    file: tokio::fs::File,
    len: u64,
    mime_type: String,
}

impl Media {
    /// Open the file at `path`.
    ///
    /// # Errors
    /// - `Error::FileOpen` if the file cannot be opened or is not a regular file
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::open(path).await.map_err(open_err)?;
        let meta = file.metadata().await.map_err(open_err)?;
        if !meta.is_file() {
            return Err(open_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len: meta.len(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
        })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the opened file, if the path has one.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Size in bytes at open time.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the file was empty at open time.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// MIME type for the media part.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Take the underlying file handle.
    pub fn into_file(self) -> tokio::fs::File {
        self.file
    }
}

/// File-creation capability of the remote service.
#[async_trait]
pub trait DriveFiles: Send + Sync {
    /// Create a file with `request` metadata and `media` as its content.
    ///
    /// # Postconditions
    /// - `Ok(Some(_))` carries the created file's metadata
    /// - `Ok(None)` means the service reported success without a payload
    ///
    /// # Errors
    /// - Network/transport errors
    /// - Non-success API responses
    async fn create(&self, request: &UploadRequest, media: Media) -> Result<Option<UploadResult>>;
}

/// Exchanges a service-account key for an authorized [`DriveFiles`] client.
#[async_trait]
pub trait DriveConnector: Send + Sync {
    /// Client type handed to the upload stage.
    type Files: DriveFiles;

    /// Authorize with `key`, registering any issued token in `secrets`.
    ///
    /// # Errors
    /// - `Error::CredentialParse` if the key material is unusable
    /// - `Error::Authentication` if no token could be obtained
    async fn connect(&self, key: ServiceAccountKey, secrets: &SecretSet) -> Result<Self::Files>;
}
