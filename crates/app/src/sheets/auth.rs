//! Google service account authentication.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// OAuth scope for reading and appending spreadsheet values.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: SignedDuration = SignedDuration::from_hours(1);
const REFRESH_MARGIN: SignedDuration = SignedDuration::from_mins(1);

/// Errors raised while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The key file could not be read.
    #[error("failed to read service account key {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key is not valid service account JSON.
    #[error("invalid service account key: {0}")]
    Parse(#[from] serde_json::Error),

    /// The private key could not be used for signing.
    #[error("failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    /// The token endpoint returned a non-2xx response.
    #[error("unexpected response from token endpoint: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

/// The parts of a service account key file the bot needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parses a key from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is not a service account key.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Uses `inline` JSON when given, otherwise reads `file`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or the key cannot be parsed.
    pub fn load(inline: Option<&str>, file: &Path) -> Result<Self, AuthError> {
        if let Some(json) = inline.filter(|json| !json.trim().is_empty()) {
            return Self::from_json(json);
        }

        let json = fs::read_to_string(file).map_err(|source| AuthError::Read {
            path: file.to_path_buf(),
            source,
        })?;

        Self::from_json(&json)
    }
}

/// Source of bearer tokens for Google APIs.
#[automock]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A valid access token.
    async fn access_token(&self) -> Result<String, AuthError>;
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone, Debug)]
struct CachedToken {
    token: String,
    refresh_at: Timestamp,
}

/// Exchanges signed service account assertions for access tokens, caching each token until a
/// minute before it expires.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountAuth {
    /// Creates an authenticator for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the private key is not a valid RSA PEM key.
    pub fn new(key: ServiceAccountKey, http: Client) -> Result<Self, AuthError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

        Ok(Self {
            key,
            signing_key,
            http,
            cached: Mutex::new(None),
        })
    }

    fn assertion(&self, now: Timestamp) -> Result<String, AuthError> {
        let issued_at = now.as_second();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: issued_at,
            exp: issued_at.saturating_add(ASSERTION_LIFETIME.as_secs()),
        };

        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.signing_key,
        )?)
    }

    async fn fetch(&self, now: Timestamp) -> Result<CachedToken, AuthError> {
        let assertion = self.assertion(now)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(AuthError::UnexpectedResponse(format!(
                "token request failed with status {status}: {text}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;

        debug!(expires_in = parsed.expires_in, "fetched google access token");

        Ok(CachedToken {
            token: parsed.access_token,
            refresh_at: refresh_at(now, parsed.expires_in),
        })
    }
}

/// When a token issued at `now` and valid for `expires_in` seconds should be replaced.
fn refresh_at(now: Timestamp, expires_in: i64) -> Timestamp {
    let lifetime = SignedDuration::from_secs(expires_in)
        .checked_sub(REFRESH_MARGIN)
        .unwrap_or(SignedDuration::ZERO);

    now.checked_add(lifetime).unwrap_or(now)
}

#[async_trait]
impl TokenSource for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, AuthError> {
        let now = Timestamp::now();
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|token| now < token.refresh_at) {
            return Ok(token.token.clone());
        }

        let fresh = self.fetch(now).await?;
        let token = fresh.token.clone();

        *cached = Some(fresh);

        Ok(token)
    }
}
