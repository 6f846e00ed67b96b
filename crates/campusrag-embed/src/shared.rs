use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;

use campusrag_core::traits::Embedder;

const STATE_UNINITIALIZED: u8 = 0;
const STATE_INITIALIZING: u8 = 1;
const STATE_READY: u8 = 2;

/// Lifecycle of the shared embedder's backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderState {
    Uninitialized,
    Initializing,
    Ready,
}

type Loader = Arc<dyn Fn() -> Result<Box<dyn Embedder>> + Send + Sync>;

/// Concurrency-safe front over an embedding backend.
///
/// The heavy backend load runs at most once: the first caller's init is
/// memoized in a `OnceCell` and every concurrent or later caller awaits
/// that same in-flight operation instead of starting another. A failed
/// load leaves the cell empty so a later call can retry.
///
/// Per-text embedding failures never reach batch callers; the failed
/// text degrades to a zero vector (similarity 0 against everything) and
/// is logged. Backend *load* failures are real errors.
pub struct SharedEmbedder {
    loader: Loader,
    cell: OnceCell<Arc<dyn Embedder>>,
    state: AtomicU8,
}

impl SharedEmbedder {
    pub fn new(loader: impl Fn() -> Result<Box<dyn Embedder>> + Send + Sync + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
            cell: OnceCell::new(),
            state: AtomicU8::new(STATE_UNINITIALIZED),
        }
    }

    /// Front over [`crate::default_backend`].
    pub fn with_default_backend() -> Self {
        Self::new(crate::default_backend)
    }

    pub fn state(&self) -> EmbedderState {
        match self.state.load(Ordering::Acquire) {
            STATE_INITIALIZING => EmbedderState::Initializing,
            STATE_READY => EmbedderState::Ready,
            _ => EmbedderState::Uninitialized,
        }
    }

    async fn backend(&self) -> Result<&Arc<dyn Embedder>> {
        self.cell
            .get_or_try_init(|| async {
                self.state.store(STATE_INITIALIZING, Ordering::Release);
                // model loads are heavy and synchronous; keep them off
                // the executor threads
                let loader = self.loader.clone();
                let loaded = tokio::task::spawn_blocking(move || (*loader)()).await;
                match loaded {
                    Ok(Ok(backend)) => {
                        self.state.store(STATE_READY, Ordering::Release);
                        Ok(Arc::from(backend))
                    }
                    Ok(Err(e)) => {
                        self.state.store(STATE_UNINITIALIZED, Ordering::Release);
                        Err(e)
                    }
                    Err(e) => {
                        self.state.store(STATE_UNINITIALIZED, Ordering::Release);
                        Err(e.into())
                    }
                }
            })
            .await
    }

    /// Force the lazy load now instead of on first embed.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.backend().await.map(|_| ())
    }

    /// Embedding dimension of the (lazily loaded) backend.
    pub async fn dim(&self) -> Result<usize> {
        Ok(self.backend().await?.dim())
    }

    /// Embed a single query text, degrading to a zero vector if the
    /// backend rejects this particular text.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let backend = self.backend().await?;
        Ok(embed_or_zero(backend.as_ref(), text))
    }

    /// Embed a batch of texts, output order matching input order 1:1.
    /// Individual failures degrade to zero vectors; the batch never
    /// aborts once the backend is loaded.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let backend = self.backend().await?;
        Ok(texts
            .iter()
            .map(|t| embed_or_zero(backend.as_ref(), t))
            .collect())
    }
}

fn embed_or_zero(backend: &dyn Embedder, text: &str) -> Vec<f32> {
    match backend.embed(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "embedding failed, substituting zero vector");
            vec![0.0; backend.dim()]
        }
    }
}
