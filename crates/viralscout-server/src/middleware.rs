use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::api::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Shared-secret auth settings used by middleware.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_key: Option<Arc<str>>,
}

impl AuthState {
    /// Builds auth from `API_KEY_SECRET`.
    ///
    /// In development a missing secret disables auth for local iteration.
    /// Anywhere else it fails startup.
    pub fn from_secret(secret: Option<&str>, is_development: bool) -> anyhow::Result<Self> {
        match secret.map(str::trim).filter(|s| !s.is_empty()) {
            Some(key) => Ok(Self::with_key(key)),
            None if is_development => {
                tracing::warn!("API_KEY_SECRET not set; api key auth disabled in development");
                Ok(Self::disabled())
            }
            None => anyhow::bail!("API_KEY_SECRET is required outside development"),
        }
    }

    #[must_use]
    pub fn with_key(key: &str) -> Self {
        Self {
            api_key: Some(Arc::from(key)),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { api_key: None }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn allows(&self, provided: &str) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| bool::from(key.as_bytes().ct_eq(provided.as_bytes())))
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the `x-api-key` header when auth is enabled.
pub async fn require_api_key(State(auth): State<AuthState>, req: Request, next: Next) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    match extract_api_key(req.headers()) {
        Some(key) if auth.allows(key) => next.run(req).await,
        _ => {
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .map(|r| r.0.clone())
                .unwrap_or_default();
            tracing::warn!(%request_id, "rejected request with missing or invalid api key");
            ApiError::new(request_id, "unauthorized", "Invalid or missing API Key").into_response()
        }
    }
}

fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
}
