//! OAuth access tokens for the Google APIs.
//!
//! Service-account credentials are exchanged with the JWT bearer grant: an
//! RS256-signed assertion is posted to the key's `token_uri` and the
//! returned access token is cached until shortly before it expires.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::GoogleError;

pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this many seconds before the reported expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// The fields of a service-account JSON key file that the token exchange
/// needs. Everything else in the file is ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// # Errors
    ///
    /// Returns [`GoogleError::Credentials`] if `json` is not a service-account
    /// key.
    pub fn from_json(json: &str) -> Result<Self, GoogleError> {
        serde_json::from_str(json)
            .map_err(|e| GoogleError::Credentials(format!("malformed service account key: {e}")))
    }

    /// # Errors
    ///
    /// Returns [`GoogleError::Credentials`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: &Path) -> Result<Self, GoogleError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            GoogleError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    refresh_at: i64,
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: Client,
    cache: Mutex<Option<CachedToken>>,
}

/// Where API calls get their bearer token from.
pub enum TokenSource {
    ServiceAccount(Box<ServiceAccountAuth>),
    /// A pre-issued token, used as-is. Handy for short-lived scripts and
    /// for tests.
    Static(String),
}

impl TokenSource {
    /// # Errors
    ///
    /// Returns [`GoogleError::Credentials`] if the private key is not a valid
    /// RSA PEM, or [`GoogleError::Http`] if the HTTP client cannot be built.
    pub fn service_account(key: ServiceAccountKey, timeout_secs: u64) -> Result<Self, GoogleError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| GoogleError::Credentials(format!("invalid private key: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self::ServiceAccount(Box::new(ServiceAccountAuth {
            key,
            encoding_key,
            client,
            cache: Mutex::new(None),
        })))
    }

    /// A bearer token for the next API call.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Auth`] when the token endpoint rejects the
    /// assertion, or [`GoogleError::Http`] on transport failure.
    pub async fn access_token(&self) -> Result<String, GoogleError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ServiceAccount(auth) => auth.access_token().await,
        }
    }
}

impl ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, GoogleError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now().timestamp();
        if let Some(cached) = cache.as_ref() {
            if now < cached.refresh_at {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken, GoogleError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| GoogleError::Credentials(format!("cannot sign assertion: {e}")))?;

        tracing::debug!(client_email = %self.key.client_email, "exchanging service account assertion");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GoogleError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TokenResponse = crate::decode_json(response, "token exchange").await?;
        let lifetime = parsed.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        Ok(CachedToken {
            token: parsed.access_token,
            refresh_at: now + lifetime - EXPIRY_SKEW_SECS,
        })
    }
}
