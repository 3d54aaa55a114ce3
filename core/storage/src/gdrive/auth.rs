//! Service-account authentication for Google Drive.
//!
//! Implements the OAuth2 JWT-bearer grant:
//! 1. Sign an RS256 assertion with the service account's private key
//! 2. POST it to the key's token endpoint
//! 3. Attach the returned bearer token to Drive requests

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use oauth2::basic::BasicTokenResponse;
use oauth2::{AccessToken, TokenResponse, TokenUrl};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use driveup_common::{Error, Result};

/// Drive scope limited to files this identity creates or opens.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Default OAuth2 token endpoint.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Grant type for the assertion exchange.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Expected value of the key file's `type` field.
const SERVICE_ACCOUNT_TYPE: &str = "service_account";
/// Lifetime of a signed assertion (the maximum Google accepts).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

/// Service-account JSON key.
///
/// Only the fields the JWT-bearer flow needs are kept. Key material is wiped
/// on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    key_type: String,
    #[serde(default)]
    client_email: String,
    #[serde(default)]
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

impl ServiceAccountKey {
    /// Parse a JSON key.
    ///
    /// # Errors
    /// - `Error::CredentialParse` if the JSON is malformed, is not a
    ///   service-account key, or lacks `client_email` / `private_key`
    pub fn from_json(json: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(json)
            .map_err(|e| Error::CredentialParse(format!("invalid JSON key: {}", e)))?;

        if key.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(Error::CredentialParse(format!(
                "'type' field is {:?} (expected {:?})",
                key.key_type, SERVICE_ACCOUNT_TYPE
            )));
        }
        if key.client_email.trim().is_empty() {
            return Err(Error::CredentialParse(
                "missing 'client_email' field".to_string(),
            ));
        }
        if key.private_key.trim().is_empty() {
            return Err(Error::CredentialParse(
                "missing 'private_key' field".to_string(),
            ));
        }

        Ok(key)
    }

    /// Identity the key belongs to.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Token endpoint the assertion is exchanged at.
    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Raw private key, for masking.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Non-empty lines of the PEM body, without the armour lines.
    ///
    /// Runners mask output line by line, so each line is masked on its own
    /// as well as the whole key.
    pub fn private_key_lines(&self) -> impl Iterator<Item = &str> {
        self.private_key
            .split('\n')
            .flat_map(|line| line.split("\\n"))
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("-----"))
    }

    /// Private key as PEM, with escaped line breaks normalised.
    fn private_key_pem(&self) -> String {
        self.private_key.replace("\\n", "\n")
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("private_key", &"[redacted]")
            .finish()
    }
}

/// JWT claims for the assertion.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

impl JwtClaims {
    fn new(key: &ServiceAccountKey, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: key.client_email.clone(),
            scope: DRIVE_FILE_SCOPE.to_string(),
            aud: key.token_uri.clone(),
            exp: iat + ASSERTION_LIFETIME_SECS,
            iat,
        }
    }
}

/// HTTP client paired with a bearer token for Drive.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    http: Client,
    token: AccessToken,
}

impl AuthorizedClient {
    /// Wrap an already issued token.
    pub fn new(http: Client, token: AccessToken) -> Self {
        Self { http, token }
    }

    /// Underlying HTTP client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Raw token value, for masking.
    pub fn token_secret(&self) -> &str {
        self.token.secret()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.secret())
    }
}

/// Signs assertions for one service account and exchanges them for tokens.
pub struct ServiceAccountAuthenticator {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token_url: TokenUrl,
    http: Client,
}

impl ServiceAccountAuthenticator {
    /// Create an authenticator for `key`.
    ///
    /// # Errors
    /// - `Error::CredentialParse` if the private key is not an RSA PEM or the
    ///   token URI is not a URL
    pub fn new(key: ServiceAccountKey, http: Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key_pem().as_bytes())
            .map_err(|e| Error::CredentialParse(format!("invalid private key: {}", e)))?;

        let token_url = TokenUrl::new(key.token_uri.clone())
            .map_err(|e| Error::CredentialParse(format!("invalid token_uri: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            token_url,
            http,
        })
    }

    /// Identity this authenticator signs for.
    pub fn client_email(&self) -> &str {
        self.key.client_email()
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &JwtClaims::new(&self.key, now), &self.encoding_key)
            .map_err(|e| Error::CredentialParse(format!("signing assertion failed: {}", e)))
    }

    /// Exchange a fresh assertion for an access token.
    ///
    /// # Errors
    /// - `Error::Authentication` on transport failure, a non-success status,
    ///   or an unreadable token response
    pub async fn authorize(self) -> Result<AuthorizedClient> {
        let assertion = self.assertion(Utc::now())?;

        tracing::debug!(
            client_email = %self.client_email(),
            token_url = %self.token_url.url(),
            "Requesting access token"
        );

        let response = self
            .http
            .post(self.token_url.url().as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "token endpoint returned {} - {}",
                status, body
            )));
        }

        let token: BasicTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Authentication(format!("invalid token response: {}", e)))?;

        tracing::debug!(
            expires_in = token.expires_in().map(|d| d.as_secs()),
            "Access token issued"
        );

        Ok(AuthorizedClient::new(self.http, token.access_token().clone()))
    }
}
