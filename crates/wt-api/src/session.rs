//! # Session Context
//!
//! The logged-in operator's credentials, passed explicitly to every call
//! that needs them. There is no ambient token storage.
//!
//! ## Token Expiry
//! The backend issues a JWT. Its signature is verified by the backend; the
//! terminal only reads the `exp` claim so it can tell the operator to log in
//! again before a save is rejected.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{ClientError, ClientResult};

/// Margin before expiry at which the session is reported as stale.
const REFRESH_MARGIN_SECS: i64 = 300;

/// The operator account returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SessionUser {
    /// Name if the account has one, email otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

/// Bearer token plus the user it belongs to.
#[derive(Clone)]
pub struct SessionContext {
    token: String,
    user: SessionUser,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Wraps a token. Tokens that are not JWTs, or carry no `exp`, never
    /// expire locally.
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        let token = token.into();
        let expires_at = read_expiry(&token);
        SessionContext {
            token,
            user,
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the token is completely expired (no grace period)
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Check if the token expires within the refresh margin
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| now + Duration::seconds(REFRESH_MARGIN_SECS) >= at)
    }

    /// Seconds of validity left; `None` when the token carries no expiry.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at
            .map(|at| (at - now).num_seconds().max(0))
    }

    /// Fails with [`ClientError::SessionExpired`] once the token is past `exp`.
    pub fn ensure_valid(&self, now: DateTime<Utc>) -> ClientResult<()> {
        if self.is_expired(now) {
            return Err(ClientError::SessionExpired);
        }
        Ok(())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

fn read_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Utc.timestamp_opt(data.claims.exp?, 0).single()
}
