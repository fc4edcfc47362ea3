use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::record::{AnalysisRecord, StoredEntity};

use super::{StoreError, StoreResult, TableStore};

/// Table store backed by Redis hashes.
///
/// Each partition lives in the hash `<table>:<partition key>`; fields are row
/// keys and values are JSON entities.
pub struct RedisTableStore {
    table_name: String,
    connection: MultiplexedConnection,
}

impl RedisTableStore {
    pub async fn connect(redis_url: &str, table_name: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url)?;
        let mut connection = client.get_multiplexed_tokio_connection().await?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut connection)
            .await?;

        Ok(Self {
            table_name: table_name.to_string(),
            connection,
        })
    }

    fn partition_hash(&self, partition_key: &str) -> String {
        partition_hash(&self.table_name, partition_key)
    }
}

fn partition_hash(table_name: &str, partition_key: &str) -> String {
    format!("{}:{}", table_name, partition_key)
}

#[async_trait]
impl TableStore for RedisTableStore {
    async fn insert(&self, record: &AnalysisRecord) -> StoreResult<()> {
        let entity = serde_json::to_string(record)?;
        let key = self.partition_hash(&record.partition_key);

        let mut conn = self.connection.clone();
        let inserted: bool = conn.hset_nx(&key, &record.row_key, entity).await?;
        if !inserted {
            return Err(StoreError::Conflict {
                partition_key: record.partition_key.clone(),
                row_key: record.row_key.clone(),
            });
        }

        tracing::debug!(key = %key, row_key = %record.row_key, "Inserted entity");
        Ok(())
    }

    async fn query_partition(&self, partition_key: &str) -> StoreResult<Vec<StoredEntity>> {
        let key = self.partition_hash(partition_key);

        let mut conn = self.connection.clone();
        let values: Vec<String> = conn.hvals(&key).await?;

        tracing::debug!(key = %key, count = values.len(), "Queried partition");
        values
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
            .collect()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
