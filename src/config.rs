use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::Context;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite:inkpost.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: &str = "5";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: load("DATABASE_URL", DEFAULT_DATABASE_URL)?,
            bind_addr: load("BIND_ADDR", DEFAULT_BIND_ADDR)?,
            max_connections: load("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        })
    }
}

fn load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_when_unset() {
        let port: u16 = load("INKPOST_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn rejects_unparseable_default() {
        let result: anyhow::Result<SocketAddr> = load("INKPOST_TEST_UNSET_ADDR", "not-an-addr");
        assert!(result.is_err());
    }
}
