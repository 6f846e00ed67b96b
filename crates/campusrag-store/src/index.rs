use campusrag_core::error::{Error, Result};
use campusrag_core::types::Chunk;

/// Immutable chunk/embedding pairs built once per index build.
///
/// Chunks and embeddings are 1:1 and order-aligned; the equal-length
/// invariant is enforced at construction so a `VectorIndex` is never
/// observably half-built. Rebuilds replace the whole value.
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn new(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Indexing(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        Ok(Self { chunks, embeddings })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Length of any stored embedding, 0 for an empty index.
    pub fn dimension(&self) -> usize {
        self.embeddings.first().map_or(0, Vec::len)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }
}

/// Cosine similarity of two vectors, defined as exactly 0 when either
/// operand has zero norm (or the lengths differ). This keeps the
/// zero-vector embedding fallback from producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
