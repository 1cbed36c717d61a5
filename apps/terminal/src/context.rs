//! # Application Context
//!
//! Everything a command handler can reach: the three state types, the
//! collaborators, and the store details used by documents.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppContext                                                             │
//! │    register ─► RegisterState      catalog ─► CatalogState               │
//! │    session  ─► SessionState       store   ─► StoreProfile               │
//! │    services ─► auth, inventory, bills, qr, export                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use wt_api::config::AppConfig;
use wt_api::{
    renderer_from_config, ApiClient, AuthClient, BillStore, ClientResult, ExportSink,
    HttpBillStore, HttpInventory, Inventory, QrRenderer,
};
use wt_core::documents::StoreProfile;
use wt_core::UpiPayee;

use crate::state::{CatalogState, RegisterState, SessionState};

/// Collaborators the console talks to.
pub struct Services {
    pub auth: AuthClient,
    pub inventory: Arc<dyn Inventory>,
    pub bills: Arc<dyn BillStore>,
    pub qr: Arc<dyn QrRenderer>,
    pub export: ExportSink,
}

impl Services {
    /// HTTP-backed collaborators from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> ClientResult<Self> {
        let api = ApiClient::new(&config.api)?;
        Ok(Services {
            auth: AuthClient::new(api.clone()),
            inventory: Arc::new(HttpInventory::new(api.clone())),
            bills: Arc::new(HttpBillStore::new(api)),
            qr: renderer_from_config(&config.qr, &config.api)?,
            export: ExportSink::new(config.export.dir.clone()),
        })
    }
}

/// Shared handle passed to every command.
#[derive(Clone)]
pub struct AppContext {
    pub register: RegisterState,
    pub catalog: CatalogState,
    pub session: SessionState,
    pub services: Arc<Services>,
    pub store: StoreProfile,
    /// Length above which the UPI note is logged as a warning.
    pub note_limit: usize,
}

impl AppContext {
    pub fn new(services: Services, payee: UpiPayee, store: StoreProfile, note_limit: usize) -> Self {
        AppContext {
            register: RegisterState::new(payee, Utc::now()),
            catalog: CatalogState::new(),
            session: SessionState::new(),
            services: Arc::new(services),
            store,
            note_limit,
        }
    }

    /// Wires the console from configuration.
    pub fn from_config(config: &AppConfig) -> ClientResult<Self> {
        Ok(AppContext::new(
            Services::from_config(config)?,
            config.payee()?,
            config.store_profile(),
            config.upi.note_limit,
        ))
    }
}
