//! # WalletTracker Terminal Library
//!
//! Operator console for WalletTracker POS. The binary in `main.rs` only
//! parses arguments and calls [`run`].
//!
//! ## Module Organization
//! ```text
//! wt_terminal/
//! ├── lib.rs          ◄─── You are here (logging, wiring, run)
//! ├── context.rs      ◄─── AppContext: state + collaborators
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── register.rs ◄─── Checkout state machine behind a mutex
//! │   ├── catalog.rs  ◄─── Loaded products and last listing
//! │   └── session.rs  ◄─── Logged-in session
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports, bill view
//! │   ├── auth.rs     ◄─── login / logout
//! │   ├── catalog.rs  ◄─── products / search / catalog edits
//! │   ├── cart.rs     ◄─── bill edits
//! │   └── checkout.rs ◄─── payment, save, export, new bill
//! ├── repl.rs         ◄─── Line parser and console loop
//! └── error.rs        ◄─── CommandError for handlers
//! ```

pub mod commands;
pub mod context;
pub mod error;
pub mod repl;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;


use std::path::PathBuf;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wt_api::AppConfig;

use crate::context::AppContext;

/// Runs the console on stdin/stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize logging (stderr, RUST_LOG or "info,wt=debug")            │
/// │  2. Load terminal.toml, apply WT_* overrides, validate                  │
/// │  3. Wire collaborators (backend client, QR renderer, export sink)       │
/// │  4. Open the register with an empty bill                                │
/// │  5. Read commands until `quit` or end of input                          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load(config_path).context("loading terminal configuration")?;
    info!(
        backend = %config.api.base_url,
        store = %config.store.name,
        payee = %config.upi.vpa,
        export_dir = %config.export.dir.display(),
        "Starting WalletTracker terminal"
    );

    let ctx = AppContext::from_config(&config).context("wiring collaborators")?;

    repl::run(&ctx, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("console I/O")?;

    info!("Terminal stopped");
    Ok(())
}

/// Writes a default `terminal.toml` for the operator to edit.
///
/// Refuses to overwrite an existing file. Returns the path written.
pub fn write_default_config(config_path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    init_tracing();

    let path = config_path
        .or_else(AppConfig::default_config_path)
        .context("no config directory available; pass a path")?;
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    AppConfig::default()
        .save(Some(path.clone()))
        .context("writing default terminal configuration")?;
    Ok(path)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=wt_api=trace` - Trace backend calls only
/// - Default: INFO, DEBUG for the `wt_*` crates
///
/// Logs go to stderr so they never interleave with console output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wt=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
