//! Operator login against `/api/auth/login`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::session::{SessionContext, SessionUser};

pub const LOGIN_PATH: &str = "api/auth/login";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: SessionUser,
}

/// Exchanges credentials for a [`SessionContext`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: ApiClient,
}

impl AuthClient {
    pub fn new(client: ApiClient) -> Self {
        AuthClient { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionContext> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::InvalidInput(
                "email and password are required".into(),
            ));
        }

        let request = self
            .client
            .request(Method::POST, LOGIN_PATH, None)?
            .json(&LoginRequest { email, password });
        let response: LoginResponse = self.client.send_json(request).await?;

        let session = SessionContext::new(response.token, response.user);
        info!(
            user = %session.user().email,
            expires_at = ?session.expires_at(),
            "Operator logged in"
        );
        Ok(session)
    }
}
