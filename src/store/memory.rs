//! In-memory table store for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::record::{AnalysisRecord, StoredEntity};

use super::{StoreError, StoreResult, TableStore};

/// Keeps entities as serialized JSON, partition -> row key -> entity.
#[derive(Clone, Default)]
pub struct InMemoryTableStore {
    partitions: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw JSON entity, bypassing record validation.
    pub async fn insert_raw(&self, partition_key: &str, row_key: &str, entity: String) {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(partition_key.to_string())
            .or_default()
            .insert(row_key.to_string(), entity);
    }

    /// Number of entities across all partitions.
    pub async fn len(&self) -> usize {
        self.partitions.read().await.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn insert(&self, record: &AnalysisRecord) -> StoreResult<()> {
        let entity = serde_json::to_string(record)?;

        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(record.partition_key.clone()).or_default();
        if partition.contains_key(&record.row_key) {
            return Err(StoreError::Conflict {
                partition_key: record.partition_key.clone(),
                row_key: record.row_key.clone(),
            });
        }
        partition.insert(record.row_key.clone(), entity);
        Ok(())
    }

    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<StoredEntity>> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(partition_key) else {
            return Ok(Vec::new());
        };

        partition
            .values()
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
            .collect()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
