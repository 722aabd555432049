// file: src/database/client.rs
// description: LanceDB-backed passage store with connection management
// reference: https://docs.rs/lancedb

use crate::config::StorageConfig;
use crate::database::schema::{batch_to_passages, passages_schema, passages_to_batch};
use crate::database::store::VectorStore;
use crate::error::{PipelineError, Result};
use crate::models::Passage;
use arrow_array::RecordBatchIterator;
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table, connect};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct LanceVectorStore {
    connection: Connection,
    config: StorageConfig,
    embedding_dim: usize,
}

impl LanceVectorStore {
    pub async fn new(config: StorageConfig, embedding_dim: usize) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri).execute().await.map_err(|e| {
            PipelineError::IndexUnavailable(format!("Failed to connect to LanceDB: {}", e))
        })?;

        Ok(Self {
            connection,
            config,
            embedding_dim,
        })
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking LanceDB connection");

        match self.connection.table_names().execute().await {
            Ok(_) => {
                debug!("LanceDB connection successful");
                Ok(true)
            }
            Err(e) => Err(PipelineError::IndexUnavailable(format!(
                "LanceDB connection failed: {}",
                e
            ))),
        }
    }

    pub async fn table_exists(&self) -> Result<bool> {
        let table_names = self.connection.table_names().execute().await.map_err(|e| {
            PipelineError::IndexUnavailable(format!("Failed to list tables: {}", e))
        })?;

        Ok(table_names.iter().any(|name| name == &self.config.table_name))
    }

    async fn open_table(&self) -> Result<Table> {
        self.connection
            .open_table(&self.config.table_name)
            .execute()
            .await
            .map_err(|e| {
                PipelineError::IndexUnavailable(format!(
                    "Failed to open table {}: {}",
                    self.config.table_name, e
                ))
            })
    }
}

#[async_trait]
impl VectorStore for LanceVectorStore {
    async fn add(&self, passages: &[Passage]) -> Result<()> {
        if passages.is_empty() {
            return Ok(());
        }

        let schema = passages_schema(self.embedding_dim);
        let batch = passages_to_batch(schema.clone(), passages)?;
        let rows = RecordBatchIterator::new(vec![Ok(batch)], schema);

        if !self.table_exists().await? {
            self.connection
                .create_table(&self.config.table_name, rows)
                .execute()
                .await
                .map_err(|e| {
                    PipelineError::IndexUnavailable(format!("Failed to create table: {}", e))
                })?;
            info!("Created new table: {}", self.config.table_name);
        } else {
            let table = self.open_table().await?;
            table.add(rows).execute().await.map_err(|e| {
                PipelineError::IndexUnavailable(format!("Failed to insert passages: {}", e))
            })?;
        }

        debug!("Inserted {} passages into {}", passages.len(), self.config.table_name);
        Ok(())
    }

    async fn nearest(&self, query: &[f32], limit: usize) -> Result<Vec<Passage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        if !self.table_exists().await? {
            debug!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;
        if table.count_rows(None).await? == 0 {
            return Ok(Vec::new());
        }

        let mut results_stream = table
            .vector_search(query.to_vec())
            .map_err(|e| {
                PipelineError::IndexUnavailable(format!("Failed to create vector search: {}", e))
            })?
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| PipelineError::IndexUnavailable(format!("Vector search failed: {}", e)))?;

        let mut passages = Vec::new();
        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result.map_err(|e| {
                PipelineError::IndexUnavailable(format!("Failed to read result batch: {}", e))
            })?;
            passages.extend(batch_to_passages(&batch)?);
        }

        debug!("Vector search returned {} candidates", passages.len());
        Ok(passages)
    }

    async fn clear(&self) -> Result<()> {
        warn!("Dropping passages table {}", self.config.table_name);

        if self.table_exists().await? {
            self.connection
                .drop_table(&self.config.table_name)
                .await
                .map_err(|e| {
                    PipelineError::IndexUnavailable(format!(
                        "Failed to drop table {}: {}",
                        self.config.table_name, e
                    ))
                })?;
            info!("Dropped table: {}", self.config.table_name);
        }

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let table = self.open_table().await?;
        let count = table.count_rows(None).await.map_err(|e| {
            PipelineError::IndexUnavailable(format!("Failed to count rows: {}", e))
        })?;

        Ok(count)
    }

    fn location(&self) -> String {
        format!("{}#{}", self.config.uri, self.config.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use crate::models::{PassageDraft, PassageKind};
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Lancedb,
            uri: dir.path().join("lancedb").to_string_lossy().to_string(),
            table_name: "passages_test".to_string(),
        }
    }

    fn passage(text: &str, embedding: Vec<f32>) -> Passage {
        let draft = PassageDraft::new(text, "l.pdf", 1, PassageKind::Text).unwrap();
        Passage::from_draft(draft, embedding)
    }

    #[tokio::test]
    async fn test_empty_store_counts_zero() {
        let dir = TempDir::new().unwrap();
        let store = LanceVectorStore::new(storage(&dir), 2).await.unwrap();

        assert!(store.ping().await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.nearest(&[1.0, 0.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_search_clear() {
        let dir = TempDir::new().unwrap();
        let store = LanceVectorStore::new(storage(&dir), 2).await.unwrap();

        store
            .add(&[passage("east", vec![1.0, 0.0]), passage("north", vec![0.0, 1.0])])
            .await
            .unwrap();
        store.add(&[passage("north east", vec![0.7071, 0.7071])]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);

        let hits = store.nearest(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(hits[0].text, "north");

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
