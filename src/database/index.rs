// file: src/database/index.rs
// description: passage index combining an embedder with a nearest-neighbor store
// reference: internal retrieval contract

use crate::database::embeddings::{Embedder, l2_normalize};
use crate::database::store::VectorStore;
use crate::error::{PipelineError, Result};
use crate::models::{Passage, PassageDraft, RetrievalResult, ScoredPassage};
use crate::retrieval::mmr;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub k: usize,
    pub fetch_k: usize,
    pub diversity_weight: f32,
    pub min_relevance: f32,
}

pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl VectorIndex {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            store,
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    /// Embeds every draft before writing, so a failed embedding leaves the
    /// store untouched. Returns the assigned passage ids in draft order.
    pub async fn insert(&self, drafts: Vec<PassageDraft>) -> Result<Vec<String>> {
        if let Some(blank) = drafts.iter().position(|d| d.text.trim().is_empty()) {
            return Err(PipelineError::Validation(format!(
                "Passage draft {} has no text",
                blank
            )));
        }
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = drafts.iter().map(|d| d.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.embedder.embed(batch).await?;
            if vectors.len() != batch.len() {
                return Err(PipelineError::Embedding(format!(
                    "Expected {} embeddings, received {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let passages: Vec<Passage> = drafts
            .into_iter()
            .zip(embeddings)
            .map(|(draft, mut embedding)| {
                l2_normalize(&mut embedding);
                Passage::from_draft(draft, embedding)
            })
            .collect();

        self.store.add(&passages).await?;
        info!("Indexed {} passages at {}", passages.len(), self.store.location());

        Ok(passages.into_iter().map(|p| p.id).collect())
    }

    pub async fn search(&self, query: &str, params: SearchParams) -> Result<RetrievalResult> {
        if params.k == 0 || self.store.count().await? == 0 {
            return Ok(RetrievalResult::empty());
        }

        let mut query_vector = self.embedder.embed_one(query).await?;
        l2_normalize(&mut query_vector);

        let fetch = params.fetch_k.max(params.k);
        let candidates = self.store.nearest(&query_vector, fetch).await?;

        let relevant: Vec<(Passage, f32)> = candidates
            .into_iter()
            .map(|passage| {
                let relevance = mmr::cosine_similarity(&query_vector, &passage.embedding);
                (passage, relevance)
            })
            .filter(|(_, relevance)| *relevance >= params.min_relevance)
            .collect();

        let relevance: Vec<f32> = relevant.iter().map(|(_, r)| *r).collect();
        let embeddings: Vec<&[f32]> = relevant.iter().map(|(p, _)| p.embedding.as_slice()).collect();
        let picked = mmr::select(&relevance, &embeddings, params.k, params.diversity_weight);

        debug!(
            "Selected {} of {} relevant candidates for query",
            picked.len(),
            relevant.len()
        );

        let hits = picked
            .into_iter()
            .map(|i| ScoredPassage::new(relevant[i].0.clone(), relevant[i].1))
            .collect();

        Ok(RetrievalResult::new(hits))
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        info!("Cleared passage index at {}", self.store.location());
        Ok(())
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }
}
