//! Named database registry.
//!
//! Maps logical names (usually [`MAIN`]) to connected providers. A lookup never waits
//! for the connection: the first lookup of a name constructs the provider, starts its
//! connect in the background and returns immediately. Callers that need the connection
//! up can await [`Database::ready`].
//!
//! ```ignore
//! let registry = DatabaseRegistry::from_env()?;
//! registry.init().await?;
//!
//! let db = registry.get(fitdb::registry::MAIN)?;
//! let rows = db.select(&SelectQuery::new("users").filter(eq("id", 1))).await?;
//!
//! registry.shutdown_all().await;
//! ```

use crate::config::{DatabaseConfig, Engine};
use crate::error::{DbError, DbResult};
use crate::provider::{DatabaseProvider, create_provider};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{info, warn};

/// Name of the primary database.
pub const MAIN: &str = "main";

/// Constructs an unconnected provider for an engine.
pub type ProviderFactory = Arc<dyn Fn(Engine) -> Arc<dyn DatabaseProvider> + Send + Sync>;

type ConnectOutcome = Option<Result<(), String>>;

/// A provider bound to one configuration, as handed out by the registry.
///
/// Derefs to the provider, so `db.select(..)` and friends work directly.
pub struct Database {
    name: String,
    config: DatabaseConfig,
    provider: Arc<dyn DatabaseProvider>,
    connected: watch::Receiver<ConnectOutcome>,
}

impl Database {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn DatabaseProvider> {
        &self.provider
    }

    /// Wait for the background connect started by the registry.
    ///
    /// Resolves immediately once the connect has finished; a failed connect is
    /// reported as [`DbError::Connection`] every time this is awaited.
    pub async fn ready(&self) -> DbResult<()> {
        let mut rx = self.connected.clone();
        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| DbError::connection(format!("connect task for {} was dropped", self.name)))?;
        match outcome.as_ref() {
            Some(Ok(())) => Ok(()),
            Some(Err(message)) => Err(DbError::connection(message.clone())),
            None => Err(DbError::connection(format!("{} is still connecting", self.name))),
        }
    }
}

impl Deref for Database {
    type Target = dyn DatabaseProvider;

    fn deref(&self) -> &Self::Target {
        self.provider.as_ref()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("connected", &self.provider.is_connected())
            .finish()
    }
}

/// Process-wide map of named databases.
///
/// Create one at startup, share it (usually behind an `Arc`) and call
/// [`shutdown_all`](Self::shutdown_all) on the way out.
pub struct DatabaseRegistry {
    configs: Mutex<HashMap<String, DatabaseConfig>>,
    instances: Mutex<HashMap<String, Arc<Database>>>,
    factory: ProviderFactory,
}

impl Default for DatabaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseRegistry {
    /// Registry building providers with [`create_provider`].
    pub fn new() -> Self {
        Self::with_factory(create_provider)
    }

    /// Registry building providers with a custom constructor.
    pub fn with_factory(
        factory: impl Fn(Engine) -> Arc<dyn DatabaseProvider> + Send + Sync + 'static,
    ) -> Self {
        Self {
            configs: Mutex::new(HashMap::new()),
            instances: Mutex::new(HashMap::new()),
            factory: Arc::new(factory),
        }
    }

    /// Registry with [`MAIN`] configured from the environment.
    pub fn from_env() -> DbResult<Self> {
        let registry = Self::new();
        registry.register(MAIN, DatabaseConfig::from_env()?);
        Ok(registry)
    }

    /// Record the configuration for `name`.
    ///
    /// An instance already handed out for `name` keeps its original configuration.
    pub fn register(&self, name: &str, config: DatabaseConfig) {
        let previous = self
            .configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), config);
        if previous.is_some() {
            warn!(database = name, "database config replaced");
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let configs = self.configs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = configs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a database by name.
    ///
    /// The first lookup builds the provider and spawns its connect on the current tokio
    /// runtime; connect failures are logged, not returned. Later lookups return the same
    /// instance.
    pub fn get(&self, name: &str) -> DbResult<Arc<Database>> {
        let mut instances = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(db) = instances.get(name) {
            return Ok(Arc::clone(db));
        }

        let config = self
            .configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::config(format!("no database registered as {name:?}")))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| DbError::config(format!("database lookup needs a tokio runtime: {e}")))?;

        let provider = (self.factory)(config.engine);
        let (tx, rx) = watch::channel(None);
        let db = Arc::new(Database {
            name: name.to_string(),
            config,
            provider,
            connected: rx,
        });

        let task_db = Arc::clone(&db);
        runtime.spawn(async move {
            let outcome = task_db.provider.connect(&task_db.config).await;
            match &outcome {
                Ok(()) => info!(database = %task_db.name, "database ready"),
                Err(err) => warn!(database = %task_db.name, error = %err, "background connect failed"),
            }
            tx.send_replace(Some(outcome.map_err(|e| e.to_string())));
        });

        instances.insert(name.to_string(), Arc::clone(&db));
        Ok(db)
    }

    /// Look up every registered database and wait for each to connect.
    ///
    /// Returns the first failure.
    pub async fn init(&self) -> DbResult<()> {
        for name in self.names() {
            self.get(&name)?.ready().await?;
        }
        Ok(())
    }

    /// Disconnect every instance handed out so far.
    ///
    /// Waits for pending background connects first. Individual failures are logged and
    /// do not stop the others from being disconnected. Instances stay registered, so a
    /// later lookup returns the same, now disconnected, instance.
    pub async fn shutdown_all(&self) {
        let instances: Vec<Arc<Database>> = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for db in instances {
            let _ = db.ready().await;
            match db.provider.disconnect().await {
                Ok(()) => info!(database = %db.name, "database disconnected"),
                Err(err) => warn!(database = %db.name, error = %err, "disconnect failed"),
            }
        }
    }
}

impl fmt::Debug for DatabaseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseRegistry")
            .field("names", &self.names())
            .finish()
    }
}
