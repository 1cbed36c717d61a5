//! Operator login and logout.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::error::CommandError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Exchanges credentials for a session and keeps it for later calls.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<LoginResponse, CommandError> {
    debug!(email = %email, "login command");

    let session = ctx.services.auth.login(email, password).await?;
    let response = LoginResponse {
        user: session.user().display_name().to_string(),
        expires_at: session.expires_at(),
    };
    ctx.session.set(session);
    Ok(response)
}

/// Forgets the session. Returns whether anyone was logged in.
pub fn logout(ctx: &AppContext) -> bool {
    let was_logged_in = ctx.session.clear();
    if was_logged_in {
        info!("Operator logged out");
    }
    was_logged_in
}
