//! Table storage for analysis records.
//!
//! The store is append-only: records are inserted under a partition key and
//! read back a whole partition at a time, in no particular order.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::record::{AnalysisRecord, StoredEntity};

pub mod memory;
pub mod redis;

pub use memory::InMemoryTableStore;
pub use self::redis::RedisTableStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Entity already exists: {partition_key}/{row_key}")]
    Conflict {
        partition_key: String,
        row_key: String,
    },

    #[error("Unsupported connection string: {0}")]
    UnsupportedConnectionString(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A key-value table service holding analysis records.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Insert a new record keyed by its partition key and row key.
    ///
    /// # Errors
    ///
    /// Fails when the row already exists or the backend is unreachable.
    async fn insert(&self, record: &AnalysisRecord) -> StoreResult<()>;

    /// Every entity stored under `partition_key`, in unspecified order.
    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<StoredEntity>>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Where and how to reach the table store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub connection_string: String,
    pub table_name: String,
}

/// Open a table store for `settings`, picking the backend from the scheme.
pub async fn connect(settings: &StoreSettings) -> StoreResult<Arc<dyn TableStore>> {
    let conn = settings.connection_string.trim();

    if conn.starts_with("memory://") {
        Ok(Arc::new(InMemoryTableStore::new()))
    } else if conn.starts_with("redis://") || conn.starts_with("rediss://") {
        let store = RedisTableStore::connect(conn, &settings.table_name).await?;
        Ok(Arc::new(store))
    } else {
        let scheme = conn.split("://").next().unwrap_or_default();
        Err(StoreError::UnsupportedConnectionString(format!("{scheme}://")))
    }
}

/// Process-wide, lazily built handle to the table store.
///
/// Construction happens at most once. A failed attempt leaves the handle
/// empty so the next caller tries again.
pub struct StoreHandle {
    settings: Option<StoreSettings>,
    store: OnceCell<Arc<dyn TableStore>>,
}

impl StoreHandle {
    pub fn new(settings: Option<StoreSettings>) -> Self {
        Self {
            settings,
            store: OnceCell::new(),
        }
    }

    /// A handle that never yields a store.
    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    /// A handle around an already constructed store.
    pub fn with_store(store: Arc<dyn TableStore>) -> Self {
        Self {
            settings: None,
            store: OnceCell::new_with(Some(store)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_some() || self.store.initialized()
    }

    /// The store, building it on first use. `None` when no connection string
    /// is configured or construction failed.
    pub async fn get(&self) -> Option<Arc<dyn TableStore>> {
        if let Some(store) = self.store.get() {
            return Some(store.clone());
        }

        let settings = self.settings.as_ref()?;
        match self.store.get_or_try_init(|| connect(settings)).await {
            Ok(store) => {
                tracing::info!(
                    backend = store.backend(),
                    table = %settings.table_name,
                    "Connected to table storage"
                );
                Some(store.clone())
            }
            Err(e) => {
                tracing::error!(error = %e, "Error connecting to table storage");
                None
            }
        }
    }
}
