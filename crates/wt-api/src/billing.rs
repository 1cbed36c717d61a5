//! # Billing Collaborator
//!
//! Persists confirmed bills. The backend decrements stock inside the same
//! transaction, so a save is never retried automatically: the operator
//! retries explicitly after reading the error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;
use wt_core::{BillPayload, Money};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::session::SessionContext;

pub const BILLS_PATH: &str = "api/billing/bills";

/// The bill as acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBill {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub bill_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SaveBillResponse {
    bill: StoredBill,
}

/// Bill persistence.
#[async_trait]
pub trait BillStore: Send + Sync {
    async fn save_bill(
        &self,
        session: &SessionContext,
        payload: &BillPayload,
    ) -> ClientResult<StoredBill>;
}

/// [`BillStore`] backed by `POST /api/billing/bills`.
#[derive(Debug, Clone)]
pub struct HttpBillStore {
    client: ApiClient,
}

impl HttpBillStore {
    pub fn new(client: ApiClient) -> Self {
        HttpBillStore { client }
    }
}

#[async_trait]
impl BillStore for HttpBillStore {
    async fn save_bill(
        &self,
        session: &SessionContext,
        payload: &BillPayload,
    ) -> ClientResult<StoredBill> {
        let request = self
            .client
            .request(Method::POST, BILLS_PATH, Some(session))?
            .json(payload);
        let response: SaveBillResponse = self.client.send_json(request).await?;

        info!(
            bill_number = %response.bill.bill_number,
            total = %payload.total,
            items = payload.items.len(),
            "Bill saved"
        );
        Ok(response.bill)
    }
}
