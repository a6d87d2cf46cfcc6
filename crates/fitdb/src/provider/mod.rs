//! Database providers: the component owning a pool and executing built statements.
//!
//! Route handlers talk to a [`DatabaseProvider`] trait object; which engine backs it is
//! decided once by [`create_provider`].

mod postgres;

pub use postgres::PgProvider;

use crate::client::QueryResult;
use crate::config::{DatabaseConfig, Engine};
use crate::error::DbResult;
use crate::qb::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery};
use crate::row::{FromRow, map_rows};
use crate::sql::Dialect;
use crate::value::Value;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

/// A client checked out of a provider's pool; returned to the pool on drop.
pub type PooledClient = deadpool_postgres::Client;

/// Snapshot of a provider's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max_size: usize,
    /// Open connections, idle or in use.
    pub size: usize,
    /// Idle connections ready to be handed out.
    pub available: usize,
    /// Callers waiting for a connection.
    pub waiting: usize,
}

impl From<deadpool_postgres::Status> for PoolStatus {
    fn from(status: deadpool_postgres::Status) -> Self {
        Self {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }
}

/// Owns the connection lifecycle and runs descriptors against the pool.
///
/// `connect` and `disconnect` are idempotent. Statements issued while disconnected are
/// still attempted and fail with [`DbError::Connection`](crate::DbError::Connection).
#[async_trait]
pub trait DatabaseProvider: Send + Sync + std::fmt::Debug {
    fn engine(&self) -> Engine;

    /// Dialect statements are rendered in before execution.
    fn dialect(&self) -> Dialect;

    fn is_connected(&self) -> bool;

    /// Pool snapshot, `None` while disconnected.
    fn status(&self) -> Option<PoolStatus>;

    /// Build the pool and verify connectivity. A no-op when already connected.
    async fn connect(&self, config: &DatabaseConfig) -> DbResult<()>;

    /// Close the pool. A no-op when not connected.
    async fn disconnect(&self) -> DbResult<()>;

    async fn select(&self, query: &SelectQuery) -> DbResult<Vec<Row>>;

    async fn insert(&self, query: &InsertQuery) -> DbResult<QueryResult>;

    async fn update(&self, query: &UpdateQuery) -> DbResult<QueryResult>;

    async fn delete(&self, query: &DeleteQuery) -> DbResult<QueryResult>;

    /// Raw parameterized SQL in the provider's native placeholder form.
    async fn query(&self, sql: &str, values: &[Value]) -> DbResult<QueryResult>;

    /// Check out one pooled client, e.g. to run several statements in a transaction.
    async fn connection(&self) -> DbResult<PooledClient>;
}

/// Typed helpers available on every provider.
#[async_trait]
pub trait DatabaseProviderExt: DatabaseProvider {
    /// Run a SELECT and map each row with [`FromRow`].
    async fn select_as<T: FromRow + Send>(&self, query: &SelectQuery) -> DbResult<Vec<T>> {
        let rows = self.select(query).await?;
        map_rows(&rows)
    }
}

impl<P: DatabaseProvider + ?Sized> DatabaseProviderExt for P {}

/// Construct an unconnected provider for an engine.
pub fn create_provider(engine: Engine) -> Arc<dyn DatabaseProvider> {
    match engine {
        Engine::Postgres => Arc::new(PgProvider::new()),
    }
}

/// Parse an engine tag and construct its provider.
///
/// Unknown tags fail with [`DbError::UnsupportedEngine`](crate::DbError::UnsupportedEngine)
/// before anything is connected.
pub fn create_provider_for(tag: &str) -> DbResult<Arc<dyn DatabaseProvider>> {
    Ok(create_provider(tag.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    #[test]
    fn factory_builds_postgres_provider() {
        for tag in ["postgres", "postgresql", "PG"] {
            let provider = create_provider_for(tag).unwrap();
            assert_eq!(provider.engine(), Engine::Postgres);
            assert_eq!(provider.dialect(), Dialect::Postgres);
            assert!(!provider.is_connected());
            assert!(provider.status().is_none());
        }
    }

    #[test]
    fn factory_rejects_unknown_engine() {
        let err = create_provider_for("mongodb").unwrap_err();
        assert!(matches!(err, DbError::UnsupportedEngine(ref tag) if tag == "mongodb"));
    }

    #[test]
    fn factory_returns_fresh_instances() {
        let a = create_provider(Engine::Postgres);
        let b = create_provider(Engine::Postgres);
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
