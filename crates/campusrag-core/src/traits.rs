/// An embedding backend: maps text to a fixed-dimension dense vector.
///
/// Implementations return unit-normalized vectors of `dim()` length.
/// Per-text failures are errors here; the fail-soft zero-vector policy
/// lives one level up in the shared embedder front, which is what the
/// store and retriever talk to.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}
