//! Command-line arguments
//!
//! Flags: `--config <path>`, `--section <name>`, `--listen <addr>`,
//! `--auth-mode basic|post`. The config path falls back to CONFIG_PATH and
//! then `oidc-client.toml`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use oidc_client::AuthMode;

/// Default listener when `--listen` is not given.
pub const DEFAULT_LISTEN_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
    8080,
);

#[derive(Debug)]
pub struct Args {
    pub config_path: Option<String>,
    pub section: Option<String>,
    pub listen_addr: SocketAddr,
    pub auth_mode: AuthMode,
}

impl Args {
    /// Parse from the full argv (program name first).
    pub fn parse(args: &[String]) -> Result<Self> {
        let flag = |name: &str| {
            args.iter()
                .position(|a| a == name)
                .and_then(|i| args.get(i + 1))
                .map(|s| s.as_str())
        };

        let listen_addr = match flag("--listen") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("invalid --listen address: {addr}"))?,
            None => DEFAULT_LISTEN_ADDR,
        };

        let auth_mode = match flag("--auth-mode") {
            Some(mode) => mode
                .parse()
                .with_context(|| format!("invalid --auth-mode: {mode}"))?,
            None => AuthMode::default(),
        };

        Ok(Self {
            config_path: flag("--config").map(str::to_owned),
            section: flag("--section").map(str::to_owned),
            listen_addr,
            auth_mode,
        })
    }
}
