use std::sync::{Arc, RwLock};

use campusrag_core::error::{Error, Result};
use campusrag_core::types::{Chunk, ScoredChunk, StoreStats};
use campusrag_embed::SharedEmbedder;

use crate::index::{cosine_similarity, VectorIndex};

/// Vector-phase relevance floor; only scores strictly above survive.
pub const SCORE_THRESHOLD: f32 = 0.3;

/// Additive boost per query term found in a chunk's text.
pub const TERM_BOOST: f32 = 0.2;

/// Query terms shorter than this carry no lexical signal.
const MIN_TERM_LEN: usize = 3;

/// In-memory vector store.
///
/// The index is written once per build and read-only for query traffic;
/// `add_chunks` swaps in a fully built replacement, so readers see the
/// old index or the new one, never a partial state.
pub struct VectorStore {
    embedder: Arc<SharedEmbedder>,
    index: RwLock<Option<Arc<VectorIndex>>>,
}

impl VectorStore {
    pub fn new(embedder: Arc<SharedEmbedder>) -> Self {
        Self {
            embedder,
            index: RwLock::new(None),
        }
    }

    /// Embed all chunk texts and atomically replace the store contents.
    ///
    /// On failure the prior index (or the empty state) is retained.
    pub async fn add_chunks(&self, chunks: Vec<Chunk>) -> Result<()> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| Error::Indexing(e.to_string()))?;
        let index = VectorIndex::new(chunks, embeddings)?;
        tracing::info!(
            chunks = index.len(),
            dimension = index.dimension(),
            "vector store indexed"
        );
        let mut guard = self.index.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::new(index));
        Ok(())
    }

    fn snapshot(&self) -> Result<Arc<VectorIndex>> {
        self.index
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(Error::NotIndexed)
    }

    /// Pure-vector search: cosine-score the query against every stored
    /// embedding, keep scores strictly above [`SCORE_THRESHOLD`], sort
    /// descending (ties keep insertion order), return the first `top_k`.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        let index = self.snapshot()?;
        let query_vec = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;

        let mut scored: Vec<ScoredChunk> = index
            .chunks()
            .iter()
            .zip(index.embeddings())
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(&query_vec, embedding),
            })
            .filter(|s| s.score > SCORE_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Two-phase hybrid search.
    ///
    /// Vector phase over a `top_k * 2` candidate pool (already
    /// threshold-filtered), then `+TERM_BOOST` per query term occurrence
    /// found as a case-insensitive substring of the chunk text, capped
    /// at 1.0. The threshold gate applies only in the vector phase, so a
    /// lexical boost can never rescue a chunk the embedder scored at or
    /// below the floor.
    pub async fn hybrid_search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        let mut results = self.search(query, top_k * 2).await?;

        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower
            .split_whitespace()
            .filter(|t| t.len() >= MIN_TERM_LEN)
            .collect();

        for result in &mut results {
            let text = result.chunk.text.to_lowercase();
            let mut boosted = result.score;
            // terms are deliberately not deduplicated: a repeated query
            // term boosts once per occurrence
            for term in &terms {
                if text.contains(term) {
                    boosted += TERM_BOOST;
                }
            }
            result.score = boosted.min(1.0);
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }

    /// Side-effect-free store snapshot.
    pub fn stats(&self) -> StoreStats {
        let guard = self.index.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(index) => StoreStats {
                chunk_count: index.len(),
                is_indexed: true,
                dimension: index.dimension(),
            },
            None => StoreStats {
                chunk_count: 0,
                is_indexed: false,
                dimension: 0,
            },
        }
    }
}
