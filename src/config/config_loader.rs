use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

use super::config_model::{BackendServer, Database, DotEnvyConfig};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BODY_LIMIT_MB: u64 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_CONN_MAX_LIFETIME_SECS: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from an arbitrary variable lookup.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let backend_server = BackendServer {
        port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
        body_limit: parse_or(&lookup, "SERVER_BODY_LIMIT", DEFAULT_BODY_LIMIT_MB)?,
        timeout: parse_or(&lookup, "SERVER_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
    };

    if backend_server.timeout == 0 {
        return Err(anyhow!("SERVER_TIMEOUT must be greater than zero"));
    }

    if backend_server.body_limit == 0 || backend_server.body_limit_bytes().is_none() {
        return Err(anyhow!(
            "SERVER_BODY_LIMIT must be between 1 and {} MiB",
            usize::MAX / (1024 * 1024)
        ));
    }

    let url = lookup("DATABASE_URL")
        .filter(|value| !value.trim().is_empty())
        .context("DATABASE_URL is missing")?;

    let database = Database {
        url,
        max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        conn_max_lifetime: parse_or(
            &lookup,
            "DATABASE_CONN_MAX_LIFETIME",
            DEFAULT_CONN_MAX_LIFETIME_SECS,
        )?,
        connect_timeout: parse_or(
            &lookup,
            "DATABASE_CONNECT_TIMEOUT",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?,
    };

    if database.max_connections == 0 {
        return Err(anyhow!("DATABASE_MAX_CONNECTIONS must be greater than zero"));
    }

    Ok(DotEnvyConfig {
        backend_server,
        database,
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}
