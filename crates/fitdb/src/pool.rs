//! Connection pool utilities

use crate::config::{DatabaseConfig, PoolConfig};
use crate::error::{DbError, DbResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime, Status};
use futures_util::future::try_join_all;
use std::cell::Cell;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::NoTls;

/// Create a connection pool for a database config.
///
/// No connection is opened here; see [`warm_up`].
///
/// # Example
///
/// ```ignore
/// let pool = fitdb::pool::create_pool(&DatabaseConfig::from_env()?)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &DatabaseConfig) -> DbResult<Pool> {
    config.pool.validate()?;

    let timeout = Some(config.pool.connection_timeout());
    let mgr = Manager::from_config(config.to_pg_config(), NoTls, default_manager_config());
    Pool::builder(mgr)
        .max_size(config.pool.max)
        .wait_timeout(timeout)
        .create_timeout(timeout)
        .recycle_timeout(timeout)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| DbError::connection(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}

/// Open `max(min, 1)` connections at once and hand them back to the pool.
///
/// Doubles as the connectivity check: any failure to connect is returned.
pub async fn warm_up(pool: &Pool, min: usize) -> DbResult<()> {
    let wanted = min.max(1);
    let clients = try_join_all((0..wanted).map(|_| pool.get())).await?;
    drop(clients);
    Ok(())
}

/// Close idle connections older than `idle_timeout`, keeping at least `min` open.
///
/// Returns how many connections were closed.
pub fn evict_idle(pool: &Pool, idle_timeout: Duration, min: usize) -> usize {
    let remaining = Cell::new(pool.status().size);
    let result = pool.retain(|_, metrics| {
        if metrics.last_used() >= idle_timeout && remaining.get() > min {
            remaining.set(remaining.get() - 1);
            false
        } else {
            true
        }
    });
    result.removed.len()
}

/// Spawn a task that runs [`evict_idle`] every `idle_timeout / 2`.
///
/// Returns `None` when idle eviction is disabled (a zero idle timeout).
pub fn spawn_idle_reaper(pool: Pool, config: PoolConfig) -> Option<JoinHandle<()>> {
    let idle_timeout = config.idle_timeout();
    if idle_timeout.is_zero() {
        return None;
    }
    let period = (idle_timeout / 2).max(Duration::from_millis(1));

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if pool.is_closed() {
                break;
            }
            let closed = evict_idle(&pool, idle_timeout, config.min);
            if closed > 0 {
                tracing::debug!(closed, status = ?pool.status(), "evicted idle connections");
            }
        }
    }))
}

/// A pool together with its idle reaper; the reaper stops when this is closed or dropped.
pub struct ManagedPool {
    pool: Pool,
    reaper: Option<JoinHandle<()>>,
}

impl ManagedPool {
    /// Build the pool, warm it up and start the idle reaper.
    ///
    /// On failure nothing is left running.
    pub async fn open(config: &DatabaseConfig) -> DbResult<Self> {
        let pool = create_pool(config)?;
        if let Err(err) = warm_up(&pool, config.pool.min).await {
            pool.close();
            return Err(err);
        }
        let reaper = spawn_idle_reaper(pool.clone(), config.pool);
        Ok(Self { pool, reaper })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn status(&self) -> Status {
        self.pool.status()
    }

    /// Stop the reaper and close every connection.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(reaper) = self.reaper.take() {
            reaper.abort();
        }
        self.pool.close();
    }
}

impl Drop for ManagedPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ManagedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedPool")
            .field("status", &self.pool.status())
            .field("reaper", &self.reaper.is_some())
            .finish()
    }
}
