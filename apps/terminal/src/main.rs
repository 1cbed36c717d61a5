//! # WalletTracker Terminal Entry Point
//!
//! ```text
//! wt-terminal [config.toml]
//! wt-terminal --init-config [config.toml]
//! ```
//!
//! Without a path the config is read from the platform config directory
//! (`terminal.toml`); `WT_*` environment variables override it.
//! `--init-config` writes the defaults there and exits.

use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args_os().skip(1);
    match args.next() {
        Some(flag) if flag == "--init-config" => {
            let path = wt_terminal::write_default_config(args.next().map(PathBuf::from))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        config_path => wt_terminal::run(config_path.map(PathBuf::from)).await,
    }
}
