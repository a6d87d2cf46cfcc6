//! Postgres provider backed by a deadpool pool.

use super::{DatabaseProvider, PoolStatus, PooledClient};
use crate::client::{GenericClient, QueryResult};
use crate::config::{DatabaseConfig, Engine};
use crate::error::{DbError, DbResult};
use crate::pool::ManagedPool;
use crate::qb::{DeleteQuery, InsertQuery, QueryBuilder, SelectQuery, UpdateQuery};
use crate::sql::Dialect;
use crate::value::Value;
use async_trait::async_trait;
use deadpool_postgres::Pool;
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;
use tokio_postgres::Row;
use tracing::{debug, info};

/// Postgres [`DatabaseProvider`].
///
/// Constructed disconnected. `connect` and `disconnect` are serialized, so concurrent
/// connects build exactly one pool.
#[derive(Debug, Default)]
pub struct PgProvider {
    lifecycle: Mutex<()>,
    pool: RwLock<Option<ManagedPool>>,
}

impl PgProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_pool(&self) -> DbResult<Pool> {
        let guard = self.pool.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|managed| managed.pool().clone())
            .ok_or_else(|| DbError::connection("postgres provider is not connected"))
    }

    async fn client(&self) -> DbResult<PooledClient> {
        let pool = self.current_pool()?;
        Ok(pool.get().await?)
    }

    async fn execute(&self, query: &impl QueryBuilder) -> DbResult<QueryResult> {
        query.validate()?;
        let client = self.client().await?;
        query.run(&client).await
    }
}

#[async_trait]
impl DatabaseProvider for PgProvider {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn is_connected(&self) -> bool {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn status(&self) -> Option<PoolStatus> {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|managed| managed.status().into())
    }

    async fn connect(&self, config: &DatabaseConfig) -> DbResult<()> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_connected() {
            debug!(host = %config.host, database = %config.database, "already connected");
            return Ok(());
        }

        let managed = ManagedPool::open(config).await?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            pool_max = config.pool.max,
            "connected to postgres"
        );
        *self.pool.write().unwrap_or_else(PoisonError::into_inner) = Some(managed);
        Ok(())
    }

    async fn disconnect(&self) -> DbResult<()> {
        let _lifecycle = self.lifecycle.lock().await;
        let managed = self
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(managed) = managed {
            managed.close();
            info!("disconnected from postgres");
        }
        Ok(())
    }

    async fn select(&self, query: &SelectQuery) -> DbResult<Vec<Row>> {
        Ok(self.execute(query).await?.rows)
    }

    async fn insert(&self, query: &InsertQuery) -> DbResult<QueryResult> {
        self.execute(query).await
    }

    async fn update(&self, query: &UpdateQuery) -> DbResult<QueryResult> {
        self.execute(query).await
    }

    async fn delete(&self, query: &DeleteQuery) -> DbResult<QueryResult> {
        self.execute(query).await
    }

    async fn query(&self, sql: &str, values: &[Value]) -> DbResult<QueryResult> {
        let client = self.client().await?;
        client.query_values(sql, values).await
    }

    async fn connection(&self) -> DbResult<PooledClient> {
        self.client().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::eq;
    use crate::value::Record;

    #[tokio::test]
    async fn disconnect_without_connect_is_noop() {
        let provider = PgProvider::new();
        provider.disconnect().await.unwrap();
        provider.disconnect().await.unwrap();
        assert!(!provider.is_connected());
    }

    #[tokio::test]
    async fn statements_fail_with_connection_error_when_disconnected() {
        let provider = PgProvider::new();

        let err = provider
            .select(&SelectQuery::new("users").filter(eq("id", 1)))
            .await
            .unwrap_err();
        assert!(err.is_connection(), "{err}");

        let err = provider.query("select 1", &[]).await.unwrap_err();
        assert!(err.is_connection(), "{err}");

        assert!(provider.connection().await.unwrap_err().is_connection());
    }

    #[tokio::test]
    async fn validation_runs_before_pool_access() {
        let provider = PgProvider::new();
        let err = provider
            .update(&UpdateQuery::new("users", Record::new(), eq("id", 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn failed_connect_leaves_provider_disconnected() {
        let config = DatabaseConfig::new("127.0.0.1", 1, "u", "p", "d").with_pool(
            crate::config::PoolConfig {
                connection_timeout_ms: 200,
                ..Default::default()
            },
        );
        let provider = PgProvider::new();
        let err = provider.connect(&config).await.unwrap_err();
        assert!(err.is_connection(), "{err}");
        assert!(!provider.is_connected());
        assert!(provider.status().is_none());
    }
}
