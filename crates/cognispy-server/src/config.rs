//! Server configuration from environment variables.

use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADVISORY_TIMEOUT_MS: u64 = 4000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `SERVER_ADDR`
    pub addr: SocketAddr,
    /// `COGNISPY_ADVISORY_URL`; without it only canned messages are shown
    pub advisory_url: Option<String>,
    /// `COGNISPY_ADVISORY_TIMEOUT_MS`
    pub advisory_timeout: Duration,
    /// `COGNISPY_SEED`; seeds every connection for reproducible boards
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process environment
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let advisory_url = lookup("COGNISPY_ADVISORY_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let advisory_timeout = match lookup("COGNISPY_ADVISORY_TIMEOUT_MS") {
            Some(ms) => ms
                .trim()
                .parse::<u64>()
                .context("COGNISPY_ADVISORY_TIMEOUT_MS is not a number")?,
            None => DEFAULT_ADVISORY_TIMEOUT_MS,
        };

        let seed = lookup("COGNISPY_SEED")
            .map(|seed| seed.trim().parse::<u64>())
            .transpose()
            .context("COGNISPY_SEED is not a number")?;

        Ok(Self {
            addr,
            advisory_url,
            advisory_timeout: Duration::from_millis(advisory_timeout),
            seed,
        })
    }
}
