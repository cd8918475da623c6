use std::time::Duration;

use anyhow::{Context, Result};
use diesel::{
    PgConnection, RunQueryDsl,
    connection::{CacheSize, Connection, SimpleConnection},
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};
use tracing::info;

use crate::config::config_model::Database;

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

/// Applied to every connection handed out by the pool.
#[derive(Debug)]
struct SessionSettings {
    statement_timeout_ms: u64,
}

impl CustomizeConnection<PgConnection, R2d2Error> for SessionSettings {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        // Statements outliving the HTTP request timeout are cancelled server side.
        conn.batch_execute(&format!(
            "SET statement_timeout = {}",
            self.statement_timeout_ms
        ))
        .map_err(R2d2Error::QueryError)?;
        Ok(())
    }
}

pub fn establish_connection(database: &Database, request_timeout_secs: u64) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(&database.url);
    let conn_max_lifetime = Duration::from_secs(database.conn_max_lifetime.max(1));
    let pool = Pool::builder()
        .max_size(database.max_connections)
        .max_lifetime(Some(conn_max_lifetime))
        .idle_timeout(Some(conn_max_lifetime))
        .connection_timeout(Duration::from_secs(database.connect_timeout.max(1)))
        .connection_customizer(Box::new(SessionSettings {
            statement_timeout_ms: request_timeout_secs.saturating_mul(1000),
        }))
        .build(manager)
        .context("failed to build Postgres connection pool")?;

    info!(
        max_connections = database.max_connections,
        conn_max_lifetime_secs = database.conn_max_lifetime,
        statement_timeout_secs = request_timeout_secs,
        "postgres: connection pool built"
    );

    Ok(pool)
}

/// Round-trips `SELECT 1` so a bad connection string fails at startup.
pub fn ping(pool: &PgPoolSquad) -> Result<()> {
    let mut conn = pool
        .get()
        .context("failed to check out a Postgres connection")?;

    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .context("Postgres ping failed")?;

    Ok(())
}
