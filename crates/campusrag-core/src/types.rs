//! Domain types shared by the chunker, store, and retriever.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// What kind of corpus record a chunk was derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Topic summary derived from a knowledge record.
    Knowledge,
    /// One question/answer restatement of a knowledge record.
    Question,
    /// Campus overview derived from a location record.
    Location,
    /// A single mapped place on a campus.
    MapLocation,
}

/// Provenance attached to every chunk. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub kind: ChunkKind,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

/// A retrievable unit of corpus text.
///
/// Created once during corpus load, never mutated, discarded and
/// regenerated wholesale on re-index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk paired with its query-time relevance score.
///
/// `score` is cosine similarity in the vector phase and the boosted,
/// capped value in `[0, 1]` after hybrid re-ranking.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Snapshot of the vector store's state. Side-effect free to produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreStats {
    pub chunk_count: usize,
    pub is_indexed: bool,
    /// Length of any stored embedding, 0 when the store is empty.
    pub dimension: usize,
}

/// One entry of the audit/UI source list returned alongside a context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: ChunkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    /// Relevance score formatted to 3 decimal places.
    pub score: String,
}

/// What the retriever hands to the completion caller: the grounding
/// context plus the source list in matching order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub context: String,
    pub sources: Vec<SourceRef>,
}

/// Full response of the `query` entrypoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub retrieved_context: String,
    pub sources: Vec<SourceRef>,
    pub stats: StoreStats,
}
