//! # Terminal Configuration
//!
//! Configuration for the backend, the store, the UPI payee, the QR service
//! and the export directory.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WT_API_URL=http://10.0.0.5:3000                                    │
//! │     WT_UPI_VPA=shop@okicici                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/terminal.toml (Linux)                                │
//! │     ~/Library/Application Support/com.wallettracker.pos/terminal.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost backend, WALLETTRACKER store, ./exports                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [api]
//! base_url = "http://localhost:3000"
//! timeout_secs = 15
//!
//! [store]
//! name = "WALLETTRACKER"
//! footer = "Thank you for shopping with us!"
//! utc_offset_minutes = 330
//!
//! [upi]
//! vpa = "shop@okicici"
//! payee_name = "WalletTracker"
//!
//! [qr]
//! size = 200
//! # endpoint = "https://qr.example.com/create"   (optional, renders remotely)
//!
//! [export]
//! dir = "exports"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use wt_core::documents::StoreProfile;
use wt_core::upi::DEFAULT_CURRENCY;
use wt_core::validation::DEFAULT_UPI_NOTE_LIMIT;
use wt_core::UpiPayee;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend API Settings
// =============================================================================

/// Where the inventory / billing / auth backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; endpoint paths such as `/api/billing/bills` are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Store details printed on receipts and notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_footer")]
    pub footer: String,

    /// Minutes east of UTC for printed timestamps (IST = 330).
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

fn default_store_name() -> String {
    wt_core::documents::DEFAULT_STORE_NAME.to_string()
}

fn default_footer() -> String {
    wt_core::documents::DEFAULT_FOOTER.to_string()
}

fn default_utc_offset() -> i32 {
    wt_core::documents::DEFAULT_UTC_OFFSET_MINUTES
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            footer: default_footer(),
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

// =============================================================================
// UPI Settings
// =============================================================================

/// Payee that receives UPI payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpiSettings {
    /// Virtual payment address (`handle@provider`).
    #[serde(default = "default_vpa")]
    pub vpa: String,

    #[serde(default = "default_payee_name")]
    pub payee_name: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Note length above which a warning is logged.
    #[serde(default = "default_note_limit")]
    pub note_limit: usize,
}

fn default_vpa() -> String {
    "wallettracker@upi".to_string()
}

fn default_payee_name() -> String {
    "WalletTracker".to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_note_limit() -> usize {
    DEFAULT_UPI_NOTE_LIMIT
}

impl Default for UpiSettings {
    fn default() -> Self {
        UpiSettings {
            vpa: default_vpa(),
            payee_name: default_payee_name(),
            currency: default_currency(),
            note_limit: default_note_limit(),
        }
    }
}

// =============================================================================
// QR Service Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrSettings {
    /// Optional image endpoint called as `<endpoint>?size=<n>x<n>&data=<uri>`.
    /// Unset renders locally and keeps the payment link on the terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Edge length in pixels.
    #[serde(default = "default_qr_size")]
    pub size: u32,
}

fn default_qr_size() -> u32 {
    200
}

impl Default for QrSettings {
    fn default() -> Self {
        QrSettings {
            endpoint: None,
            size: default_qr_size(),
        }
    }
}

// =============================================================================
// Export Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory receiving `bill_<number>.*` files.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            dir: default_export_dir(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub upi: UpiSettings,

    #[serde(default)]
    pub qr: QrSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (terminal.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Terminal config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let base = Url::parse(&self.api.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if let Some(endpoint) = &self.qr.endpoint {
            Url::parse(endpoint)?;
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.qr.size == 0 {
            return Err(ClientError::InvalidConfig(
                "qr size must be greater than 0".into(),
            ));
        }

        if self.store.name.trim().is_empty() {
            return Err(ClientError::InvalidConfig("store name is required".into()));
        }

        self.payee()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("WT_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(vpa) = std::env::var("WT_UPI_VPA") {
            debug!(vpa = %vpa, "Overriding UPI VPA from environment");
            self.upi.vpa = vpa;
        }

        if let Ok(name) = std::env::var("WT_UPI_NAME") {
            self.upi.payee_name = name;
        }

        if let Ok(name) = std::env::var("WT_STORE_NAME") {
            self.store.name = name;
        }

        if let Ok(dir) = std::env::var("WT_EXPORT_DIR") {
            debug!(dir = %dir, "Overriding export directory from environment");
            self.export.dir = PathBuf::from(dir);
        }

        if let Ok(endpoint) = std::env::var("WT_QR_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding QR endpoint from environment");
            self.qr.endpoint = Some(endpoint).filter(|e| !e.trim().is_empty());
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "wallettracker", "pos")
            .map(|dirs| dirs.config_dir().join("terminal.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Store details for document generation.
    pub fn store_profile(&self) -> StoreProfile {
        StoreProfile {
            name: self.store.name.clone(),
            footer: self.store.footer.clone(),
            utc_offset_minutes: self.store.utc_offset_minutes,
        }
    }

    /// Validated UPI payee.
    pub fn payee(&self) -> ClientResult<UpiPayee> {
        let mut payee = UpiPayee::new(self.upi.vpa.trim(), self.upi.payee_name.trim())
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        payee.currency = self.upi.currency.clone();
        Ok(payee)
    }

    /// Parsed backend base URL.
    pub fn base_url(&self) -> ClientResult<Url> {
        Ok(Url::parse(&self.api.base_url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.store.name, "WALLETTRACKER");
        assert_eq!(config.upi.currency, "INR");
        assert_eq!(config.upi.note_limit, 255);
        assert!(config.qr.endpoint.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://pos.example.com".to_string();
        assert!(config.validate().is_ok());

        config.upi.vpa = "no-at-sign".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());

        config.upi.vpa = "shop@okicici".to_string();
        config.qr.endpoint = Some("not a url".to_string());
        assert!(config.validate().unwrap_err().is_config_error());

        config.qr.endpoint = Some("https://qr.example.com/create".to_string());
        assert!(config.validate().is_ok());

        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [upi]
            vpa = "shop@okicici"

            [store]
            name = "CORNER STORE"
            "#,
        )
        .unwrap();

        assert_eq!(config.upi.vpa, "shop@okicici");
        assert_eq!(config.upi.payee_name, "WalletTracker");
        assert_eq!(config.store.name, "CORNER STORE");
        assert_eq!(config.store.utc_offset_minutes, 330);
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.qr.size, 200);
    }

    #[test]
    fn test_store_profile_and_payee() {
        let mut config = AppConfig::default();
        config.store.name = "CORNER STORE".to_string();
        config.upi.vpa = "corner@okaxis".to_string();

        assert_eq!(config.store_profile().title(), "CORNER STORE BILL");
        let payee = config.payee().unwrap();
        assert_eq!(payee.vpa, "corner@okaxis");
        assert_eq!(payee.currency, "INR");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("wt-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("terminal.toml");

        let mut config = AppConfig::default();
        config.upi.vpa = "shop@okicici".to_string();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(contents.contains("[upi]"));
        assert!(!contents.contains("endpoint"));

        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.upi.vpa, "shop@okicici");

        std::fs::remove_dir_all(dir).ok();
    }
}
