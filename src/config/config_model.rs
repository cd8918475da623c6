#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Request body limit in MiB.
    pub body_limit: u64,
    /// Request timeout in seconds. Also applied as the Postgres `statement_timeout`.
    pub timeout: u64,
}

impl BackendServer {
    /// Body limit in bytes, `None` when it does not fit in `usize`.
    pub fn body_limit_bytes(&self) -> Option<usize> {
        self.body_limit
            .checked_mul(1024 * 1024)
            .and_then(|bytes| usize::try_from(bytes).ok())
    }
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    /// Seconds before a pooled connection is recycled.
    pub conn_max_lifetime: u64,
    /// Seconds to wait for a free pooled connection.
    pub connect_timeout: u64,
}
