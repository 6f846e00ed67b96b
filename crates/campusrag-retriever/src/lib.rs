#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! campusrag-retriever
//!
//! The orchestrator: builds the vector index from the corpus exactly
//! once (lazily, single-flight), runs hybrid search, and formats results
//! into a grounding context plus a parallel source list. Nothing throws
//! past `retrieve_context` — every internal failure becomes a fixed,
//! user-safe degraded response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::OnceCell;

use campusrag_chunk::chunk_corpus;
use campusrag_core::corpus::Corpus;
use campusrag_core::types::{QueryResponse, RetrievedContext, ScoredChunk, SourceRef};
use campusrag_store::VectorStore;

/// Results returned when the caller does not pick a top-k.
pub const DEFAULT_TOP_K: usize = 5;

/// Context returned when no chunk survives retrieval. A normal outcome,
/// not a failure.
pub const NO_MATCH_CONTEXT: &str = "No relevant information found in university database.";

/// Context returned when retrieval fails internally.
pub const ERROR_CONTEXT: &str = "Error retrieving information. Please try again.";

/// Separator between chunks in the assembled context, so a downstream
/// consumer can split them back apart.
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

const PREVIEW_CHARS: usize = 200;

/// Timing/diagnostics view of one retrieval, for the CLI `debug`
/// command.
#[derive(Debug, Clone, Serialize)]
pub struct DebugReport {
    pub query: String,
    pub response_time_ms: u64,
    pub chunk_count: usize,
    pub sources: Vec<SourceRef>,
    pub context_preview: String,
}

pub struct Retriever {
    corpus: Corpus,
    store: Arc<VectorStore>,
    ready: OnceCell<()>,
}

impl Retriever {
    pub fn new(corpus: Corpus, store: Arc<VectorStore>) -> Self {
        Self {
            corpus,
            store,
            ready: OnceCell::new(),
        }
    }

    /// Chunk the corpus and build the index, at most once per process.
    /// Concurrent first callers join the same in-flight build.
    pub async fn ensure_ready(&self) -> anyhow::Result<()> {
        self.ready
            .get_or_try_init(|| async {
                let chunks = chunk_corpus(&self.corpus);
                tracing::info!(chunks = chunks.len(), "building retrieval index");
                self.store.add_chunks(chunks).await?;
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    /// Retrieve grounding context for a query. Never fails: zero hits
    /// yield the no-match sentinel, internal failures the error
    /// sentinel, both with an empty source list.
    pub async fn retrieve_context(&self, query: &str, top_k: usize) -> RetrievedContext {
        match self.try_retrieve(query, top_k).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "retrieval failed, returning degraded response");
                degraded(ERROR_CONTEXT)
            }
        }
    }

    /// Like [`Self::retrieve_context`] but bounded; expiry is treated
    /// identically to an internal failure.
    pub async fn retrieve_context_with_timeout(
        &self,
        query: &str,
        top_k: usize,
        timeout: Duration,
    ) -> RetrievedContext {
        match tokio::time::timeout(timeout, self.retrieve_context(query, top_k)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(timeout_ms = timeout.as_millis() as u64, "retrieval timed out");
                degraded(ERROR_CONTEXT)
            }
        }
    }

    async fn try_retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<RetrievedContext> {
        self.ensure_ready().await?;
        let results = self.store.hybrid_search(query, top_k).await?;
        if results.is_empty() {
            return Ok(degraded(NO_MATCH_CONTEXT));
        }

        let context = results
            .iter()
            .map(format_chunk)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);
        let sources = results.iter().map(source_ref).collect();
        Ok(RetrievedContext { context, sources })
    }

    /// Full response for a caller: context + sources + store stats.
    pub async fn query(&self, query: &str) -> QueryResponse {
        let RetrievedContext { context, sources } =
            self.retrieve_context(query, DEFAULT_TOP_K).await;
        QueryResponse {
            retrieved_context: context,
            sources,
            stats: self.store.stats(),
        }
    }

    /// Timed retrieval with a truncated context preview.
    pub async fn debug_report(&self, query: &str) -> DebugReport {
        let start = Instant::now();
        let result = self.retrieve_context(query, DEFAULT_TOP_K).await;
        DebugReport {
            query: query.to_string(),
            response_time_ms: start.elapsed().as_millis() as u64,
            chunk_count: result.sources.len(),
            context_preview: preview(&result.context),
            sources: result.sources,
        }
    }
}

fn degraded(context: &str) -> RetrievedContext {
    RetrievedContext {
        context: context.to_string(),
        sources: Vec::new(),
    }
}

/// One-line provenance header plus the chunk text.
fn format_chunk(result: &ScoredChunk) -> String {
    format!(
        "[Source: {} | Topic: {}]\n{}",
        result.chunk.metadata.source,
        result.chunk.metadata.topic.as_deref().unwrap_or("General"),
        result.chunk.text,
    )
}

fn source_ref(result: &ScoredChunk) -> SourceRef {
    SourceRef {
        kind: result.chunk.metadata.kind,
        topic: result.chunk.metadata.topic.clone(),
        campus: result.chunk.metadata.campus.clone(),
        place: result.chunk.metadata.place.clone(),
        score: format!("{:.3}", result.score),
    }
}

fn preview(context: &str) -> String {
    let mut p: String = context.chars().take(PREVIEW_CHARS).collect();
    if context.chars().count() > PREVIEW_CHARS {
        p.push_str("...");
    }
    p
}
