// file: src/retrieval/retriever.rs
// description: fixed-policy passage retrieval over the vector index
// reference: internal retrieval contract

use crate::config::RetrievalConfig;
use crate::database::{SearchParams, VectorIndex};
use crate::error::Result;
use crate::models::RetrievalResult;
use std::sync::Arc;
use tracing::debug;

pub struct Retriever {
    index: Arc<VectorIndex>,
    params: SearchParams,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, config: &RetrievalConfig) -> Self {
        Self {
            index,
            params: SearchParams {
                k: config.k,
                fetch_k: config.fetch_k,
                diversity_weight: config.diversity_weight,
                min_relevance: config.min_relevance,
            },
        }
    }

    /// Empty index yields an empty result rather than an error.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult> {
        let result = self.index.search(question, self.params).await?;
        debug!(
            "Retrieved {} passages (k={}, fetch_k={}, lambda={}, min_relevance={})",
            result.len(),
            self.params.k,
            self.params.fetch_k,
            self.params.diversity_weight,
            self.params.min_relevance
        );
        Ok(result)
    }

    /// Same selection with a caller-chosen result count.
    pub async fn retrieve_top(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        let params = SearchParams {
            k,
            fetch_k: self.params.fetch_k.max(k),
            ..self.params
        };
        self.index.search(question, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{HashingEmbedder, MemoryVectorStore};
    use crate::models::{PassageDraft, PassageKind};

    fn retriever(config: RetrievalConfig) -> (Arc<VectorIndex>, Retriever) {
        let index = Arc::new(VectorIndex::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(256)),
            8,
        ));
        let retriever = Retriever::new(index.clone(), &config);
        (index, retriever)
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_result() {
        let (_, retriever) = retriever(RetrievalConfig::default());
        let result = retriever.retrieve("anything at all").await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_retrieval_is_deterministic_and_bounded() {
        let config = RetrievalConfig {
            k: 2,
            fetch_k: 10,
            diversity_weight: 0.5,
            min_relevance: 0.0,
        };
        let (index, retriever) = retriever(config);
        let drafts = (1..=5)
            .map(|i| {
                PassageDraft::new(format!("quarterly revenue note {}", i), "q.pdf", i, PassageKind::Text)
                    .unwrap()
            })
            .collect();
        index.insert(drafts).await.unwrap();

        let first = retriever.retrieve("quarterly revenue").await.unwrap();
        let second = retriever.retrieve("quarterly revenue").await.unwrap();

        assert_eq!(first.len(), 2);
        let ids = |r: &RetrievalResult| r.passages().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_retrieve_top_overrides_k() {
        let (index, retriever) = retriever(RetrievalConfig {
            min_relevance: 0.0,
            ..RetrievalConfig::default()
        });
        let drafts = ["one", "two", "three"]
            .iter()
            .map(|t| PassageDraft::new(*t, "n.pdf", 1, PassageKind::Text).unwrap())
            .collect();
        index.insert(drafts).await.unwrap();

        assert_eq!(retriever.retrieve_top("one", 1).await.unwrap().len(), 1);
    }
}
