//! # Backend HTTP Client
//!
//! Thin wrapper over `reqwest` shared by the auth, inventory and billing
//! collaborators.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request(method, path, session)                                         │
//! │      │  base_url + path                                                 │
//! │      │  Authorization: Bearer <token>   (when a session is given)       │
//! │      │  x-request-id: <uuid v4>                                         │
//! │      ▼                                                                  │
//! │  send_json / send_empty                                                 │
//! │      │  2xx      → body decoded                                         │
//! │      │  401/403  → ClientError::Unauthorized                            │
//! │      │  other    → ClientError::Rejected { status, message }            │
//! │      ▼             (message taken from the `{ "message": .. }` body)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Shared HTTP client for the backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(concat!("wt-terminal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut base = Url::parse(&settings.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(ApiClient { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves an endpoint path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Starts a request. With a session, the token is checked for local
    /// expiry and sent as a bearer credential.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        session: Option<&SessionContext>,
    ) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let request_id = Uuid::new_v4();
        debug!(%method, %url, %request_id, "Backend request");

        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(session) = session {
            session.ensure_valid(Utc::now())?;
            builder = builder.bearer_auth(session.token());
        }

        Ok(builder)
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Sends the request and ignores any body.
    pub async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        check_status(builder.send().await?).await?;
        Ok(())
    }
}

/// Maps non-2xx responses into [`ClientError`].
pub(crate) async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    warn!(status = status.as_u16(), message = %message, "Backend returned an error");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized(message)),
        _ => Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Some(message) = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> ApiClient {
        ApiClient::new(&ApiSettings {
            base_url: base.to_string(),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = api("http://pos.example.com/backend");
        assert_eq!(
            client.endpoint("/api/billing/bills").unwrap().as_str(),
            "http://pos.example.com/backend/api/billing/bills"
        );

        let client = api("http://localhost:3000");
        assert_eq!(
            client.endpoint("api/inventory/products").unwrap().as_str(),
            "http://localhost:3000/api/inventory/products"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Insufficient stock for Rice"}"#),
            "Insufficient stock for Rice"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, r#"{"error":true}"#),
            "Bad Gateway"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "database down"),
            "database down"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::new(&ApiSettings {
            base_url: "not a url".to_string(),
            ..ApiSettings::default()
        });
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
