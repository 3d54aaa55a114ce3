//! Google Drive files client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use reqwest::{header, Body, Client, StatusCode};
use tokio_util::io::ReaderStream;
use url::Url;
use uuid::Uuid;

use driveup_common::{Error, Result, SecretSet};

use super::auth::{AuthorizedClient, ServiceAccountAuthenticator, ServiceAccountKey};
use crate::provider::{DriveConnector, DriveFiles, Media, UploadRequest, UploadResult};

/// Google Drive upload API base URL.
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
/// Fields requested from `files.create`.
const CREATE_FIELDS: &str = "id,name,webViewLink,webContentLink,exportLinks";
const USER_AGENT: &str = concat!("driveup/", env!("CARGO_PKG_VERSION"));

/// Base URL of the Drive upload API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEndpoint {
    base: Url,
}

impl UploadEndpoint {
    /// Parse an endpoint base such as `https://www.googleapis.com/upload/drive/v3`.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if `base` is not an http(s) URL
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::InvalidInput(format!("Invalid upload URL {:?}: {}", base, e)))?;
        if base.scheme() != "https" && base.scheme() != "http" {
            return Err(Error::InvalidInput(format!(
                "Upload URL must be http(s), got {:?}",
                base.scheme()
            )));
        }
        Ok(Self { base })
    }

    /// URL of the files collection.
    pub fn files_url(&self) -> String {
        format!("{}/files", self.base.as_str().trim_end_matches('/'))
    }
}

impl Default for UploadEndpoint {
    fn default() -> Self {
        Self {
            base: Url::parse(DRIVE_UPLOAD_BASE).expect("default upload URL is valid"),
        }
    }
}

/// Framing of a `multipart/related` upload: a JSON metadata part followed
/// by the media part.
struct MultipartBody {
    boundary: String,
    head: Bytes,
    tail: Bytes,
}

impl MultipartBody {
    fn new(request: &UploadRequest, mime_type: &str) -> Result<Self> {
        Self::with_boundary(format!("driveup-{}", Uuid::new_v4().simple()), request, mime_type)
    }

    fn with_boundary(boundary: String, request: &UploadRequest, mime_type: &str) -> Result<Self> {
        let metadata = serde_json::to_string(request)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize metadata: {}", e)))?;

        let head = format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
             --{b}\r\nContent-Type: {mime_type}\r\n\r\n",
            b = boundary,
        );
        let tail = format!("\r\n--{}--\r\n", boundary);

        Ok(Self {
            boundary,
            head: Bytes::from(head),
            tail: Bytes::from(tail),
        })
    }

    fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }

    fn content_length(&self, media_len: u64) -> u64 {
        self.head.len() as u64 + media_len + self.tail.len() as u64
    }

    /// Wrap `media` between the framing parts without buffering it.
    fn into_stream<S>(self, media: S) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        stream::once(async move { Ok(self.head) })
            .chain(media)
            .chain(stream::once(async move { Ok(self.tail) }))
    }
}

/// Google Drive API client bound to one access token.
pub struct DriveClient {
    auth: AuthorizedClient,
    endpoint: UploadEndpoint,
}

impl DriveClient {
    /// Create a new Drive client.
    pub fn new(auth: AuthorizedClient, endpoint: UploadEndpoint) -> Self {
        Self { auth, endpoint }
    }
}

#[async_trait]
impl DriveFiles for DriveClient {
    async fn create(&self, request: &UploadRequest, media: Media) -> Result<Option<UploadResult>> {
        let body = MultipartBody::new(request, media.mime_type())?;
        let content_type = body.content_type();
        let content_length = body.content_length(media.len());

        tracing::debug!(
            file_name = %request.name(),
            bytes = media.len(),
            "Uploading file"
        );

        let stream = body.into_stream(ReaderStream::new(media.into_file()));

        let response = self
            .auth
            .http()
            .post(self.endpoint.files_url())
            .header(header::AUTHORIZATION, self.auth.bearer())
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, content_length)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", CREATE_FIELDS),
                ("supportsAllDrives", "true"),
            ])
            .body(Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to upload file: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read upload response: {}", e)))?;

        parse_create_response(status, &text)
    }
}

/// Interpret the status and body of a `files.create` response.
fn parse_create_response(status: StatusCode, body: &str) -> Result<Option<UploadResult>> {
    if status.is_success() {
        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }
        serde_json::from_str(body)
            .map(Some)
            .map_err(|e| Error::Network(format!("Failed to parse response: {}", e)))
    } else if status == StatusCode::UNAUTHORIZED {
        Err(Error::Authentication(
            "Invalid or expired token".to_string(),
        ))
    } else {
        Err(Error::Network(format!("API error: {} - {}", status, body)))
    }
}

/// Connects to Drive with service-account credentials.
pub struct ServiceAccountConnector {
    http: Client,
    endpoint: UploadEndpoint,
}

impl ServiceAccountConnector {
    /// Create a connector targeting `endpoint`.
    ///
    /// # Errors
    /// - `Error::Authentication` if the HTTP client cannot be built
    pub fn new(endpoint: UploadEndpoint) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Authentication(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl DriveConnector for ServiceAccountConnector {
    type Files = DriveClient;

    async fn connect(&self, key: ServiceAccountKey, secrets: &SecretSet) -> Result<DriveClient> {
        let authenticator = ServiceAccountAuthenticator::new(key, self.http.clone())?;
        tracing::info!(
            client_email = %authenticator.client_email(),
            "Authenticating service account"
        );

        let auth = authenticator.authorize().await?;
        secrets.register(auth.token_secret());

        Ok(DriveClient::new(auth, self.endpoint.clone()))
    }
}
