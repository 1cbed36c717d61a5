//! # wt-api: Backend Collaborators for WalletTracker POS
//!
//! Everything the terminal does outside its own memory lives here: the
//! inventory and billing backend, operator login, QR image rendering,
//! configuration files and bill exports.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Collaborator Layer                               │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 ApiClient (reqwest, bearer, x-request-id)        │  │
//! │  └────────────┬──────────────────────┬──────────────────────┬───────┘  │
//! │               ▼                      ▼                      ▼          │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │ AuthClient         │  │ Inventory          │  │ BillStore        │  │
//! │  │ login → Session    │  │ products CRUD      │  │ save confirmed   │  │
//! │  └────────────────────┘  └────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │ QrRenderer         │  │ ExportSink         │  │ AppConfig        │  │
//! │  │ UpiUri → image     │  │ txt / json / print │  │ TOML + WT_* env  │  │
//! │  └────────────────────┘  └────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  Credentials travel as an explicit SessionContext argument.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Terminal configuration (backend, store, payee, QR, export)
//! - [`error`] - Collaborator error types
//! - [`session`] - Session context and token expiry
//! - [`client`] - Shared HTTP client
//! - [`auth`] - Operator login
//! - [`inventory`] - Product catalog collaborator
//! - [`billing`] - Bill persistence collaborator
//! - [`qr`] - QR rendering collaborator
//! - [`export`] - Bill document files

pub mod auth;
pub mod billing;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod inventory;
pub mod qr;
pub mod session;

pub use auth::AuthClient;
pub use billing::{BillStore, HttpBillStore, StoredBill};
pub use client::ApiClient;
pub use config::AppConfig;
pub use error::{ClientError, ClientResult};
pub use export::{ExportFormat, ExportSink};
pub use inventory::{HttpInventory, Inventory};
pub use qr::{render_outcome, renderer_from_config, HttpQrRenderer, LocalQrRenderer, QrRenderer};
pub use session::{SessionContext, SessionUser};

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
