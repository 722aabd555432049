// file: src/database/store.rs
// description: nearest-neighbor store abstraction and in-memory backend
// reference: internal storage contract

use crate::error::Result;
use crate::models::Passage;
use crate::retrieval::mmr::cosine_similarity;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Persistence for embedded passages. Reads always hand back owned copies.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Adds all passages in one write.
    async fn add(&self, passages: &[Passage]) -> Result<()>;

    /// Up to `limit` passages closest to `query`, nearest first.
    async fn nearest(&self, query: &[f32], limit: usize) -> Result<Vec<Passage>>;

    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    fn location(&self) -> String;
}

#[derive(Default)]
pub struct MemoryVectorStore {
    passages: RwLock<Vec<Passage>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add(&self, passages: &[Passage]) -> Result<()> {
        let mut stored = self.passages.write().await;
        stored.extend_from_slice(passages);
        debug!("Memory store now holds {} passages", stored.len());
        Ok(())
    }

    async fn nearest(&self, query: &[f32], limit: usize) -> Result<Vec<Passage>> {
        let stored = self.passages.read().await;

        let mut ranked: Vec<(usize, f32)> = stored
            .iter()
            .enumerate()
            .map(|(i, passage)| (i, cosine_similarity(query, &passage.embedding)))
            .collect();

        // stable sort keeps insertion order among equal scores
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(i, _)| stored[i].clone())
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.passages.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.passages.read().await.len())
    }

    fn location(&self) -> String {
        "memory://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PassageDraft, PassageKind};

    fn passage(text: &str, embedding: Vec<f32>) -> Passage {
        let draft = PassageDraft::new(text, "m.pdf", 1, PassageKind::Text).unwrap();
        Passage::from_draft(draft, embedding)
    }

    #[test]
    fn test_nearest_orders_by_similarity() {
        tokio_test::block_on(async {
            let store = MemoryVectorStore::new();
            store
                .add(&[
                    passage("x axis", vec![1.0, 0.0]),
                    passage("y axis", vec![0.0, 1.0]),
                    passage("diagonal", vec![0.7071, 0.7071]),
                ])
                .await
                .unwrap();

            let hits = store.nearest(&[0.0, 1.0], 2).await.unwrap();
            assert_eq!(hits.len(), 2);
            assert_eq!(hits[0].text, "y axis");
            assert_eq!(hits[1].text, "diagonal");
        });
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = MemoryVectorStore::new();
        store.add(&[passage("a", vec![1.0])]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.nearest(&[1.0], 5).await.unwrap().is_empty());
    }
}
