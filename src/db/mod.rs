pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

pub use memory::MemoryDocumentStore;
pub use models::{Entity, EntityKind};
pub use postgres::PgDocumentStore;
pub use store::{DocumentStore, Filter, Record, StoreError, StoreResult, ID_FIELD};

/// `DATABASE_URL` prefix selecting the in-process store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: Option<String>,
    pub database_name: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            database_name: None,
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 10,
            idle_timeout_secs: 300,
        }
    }
}

impl DbConfig {
    /// Pool tuning comes from `DB_POOL_MAX`, `DB_POOL_MIN`,
    /// `DB_CONNECT_TIMEOUT` and `DB_IDLE_TIMEOUT`.
    pub fn from_env(url: Option<String>, database_name: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            url,
            database_name,
            max_connections: env_or("DB_POOL_MAX", defaults.max_connections),
            min_connections: env_or("DB_POOL_MIN", defaults.min_connections),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT", defaults.connect_timeout_secs),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT", defaults.idle_timeout_secs),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Handle to the document store, established once at startup and shared by
/// every handler. A disconnected handle fails every operation with
/// [`StoreError::Unavailable`].
#[derive(Clone, Default)]
pub struct Database {
    store: Option<Arc<dyn DocumentStore>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn disconnected() -> Self {
        Self { store: None }
    }

    /// Open the store named by `config.url`.
    ///
    /// Never fails: a missing URL or a failed connection yields a
    /// disconnected handle and the service keeps running.
    pub async fn connect(config: &DbConfig) -> Self {
        let Some(url) = config.url.as_deref() else {
            tracing::info!("DATABASE_URL not set. Running without database connection.");
            return Self::disconnected();
        };

        if url.starts_with(MEMORY_URL_SCHEME) {
            let name = config.database_name.as_deref().unwrap_or("memory");
            tracing::info!(database = %name, "Using in-memory document store");
            return Self::new(Arc::new(MemoryDocumentStore::new(name)));
        }

        tracing::info!("Initializing database connection pool...");
        match PgDocumentStore::connect(config, url).await {
            Ok(store) => {
                tracing::info!(database = %store.name(), "Database connection pool initialized successfully");
                Self::new(Arc::new(store))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Continuing without database.",
                    e
                );
                Self::disconnected()
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// Name of the connected database, if any.
    pub fn name(&self) -> Option<&str> {
        self.store.as_deref().map(|s| s.name())
    }

    fn store(&self) -> StoreResult<&dyn DocumentStore> {
        self.store.as_deref().ok_or(StoreError::Unavailable)
    }

    /// Persist `entity` in its kind's collection and return the new id.
    pub async fn create<E: Entity>(&self, entity: &E) -> StoreResult<String> {
        let store = self.store()?;

        let mut body = match serde_json::to_value(entity)? {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::NotAnObject {
                    kind: E::KIND.name(),
                })
            }
        };
        body.remove(ID_FIELD);

        let id = uuid::Uuid::new_v4().to_string();
        store.insert(E::KIND.collection(), &id, body).await?;
        tracing::debug!(collection = E::KIND.collection(), id = %id, "document inserted");
        Ok(id)
    }

    /// Raw records of `kind`, each still carrying [`ID_FIELD`].
    pub async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        self.store()?.find(kind.collection(), filter, limit).await
    }

    pub async fn collection_names(&self) -> StoreResult<Vec<String>> {
        self.store()?.collection_names().await
    }

    /// Round-trip latency to the store.
    pub async fn health_check(&self) -> StoreResult<Duration> {
        let store = self.store()?;
        let start = Instant::now();
        store.ping().await?;
        Ok(start.elapsed())
    }

    pub async fn close(&self) {
        if let Some(store) = &self.store {
            tracing::info!("Closing database connection");
            store.close().await;
        }
    }
}
