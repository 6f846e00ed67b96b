use std::sync::Arc;

use anyhow::anyhow;
use campusrag_core::error::Error;
use campusrag_core::traits::Embedder;
use campusrag_core::types::{Chunk, ChunkKind, ChunkMetadata};
use campusrag_embed::SharedEmbedder;
use campusrag_store::{cosine_similarity, VectorIndex, VectorStore};

/// Marker-word embedder with hand-picked directions, so similarity
/// against an "alpha" query is predictable:
/// alpha -> 1.0, blend -> 0.6, edge -> ~0.2 (below threshold), beta -> 0.
struct MarkerEmbedder;

impl Embedder for MarkerEmbedder {
    fn dim(&self) -> usize {
        3
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let t = text.to_lowercase();
        if t.contains("reject") {
            return Err(anyhow!("marker backend rejected text"));
        }
        if t.contains("alpha") {
            Ok(vec![1.0, 0.0, 0.0])
        } else if t.contains("blend") {
            Ok(vec![0.6, 0.8, 0.0])
        } else if t.contains("edge") {
            // cos against [1,0,0] = 1/sqrt(1 + 4.8^2) ~= 0.204
            Ok(vec![1.0, 4.8, 0.0])
        } else {
            Ok(vec![0.0, 1.0, 0.0])
        }
    }
}

fn chunk(text: &str) -> Chunk {
    Chunk {
        id: format!("chunk-{text}"),
        text: text.to_string(),
        metadata: ChunkMetadata {
            kind: ChunkKind::Knowledge,
            source: "knowledge.json".to_string(),
            topic: None,
            campus: None,
            place: None,
        },
    }
}

fn marker_store() -> VectorStore {
    VectorStore::new(Arc::new(SharedEmbedder::new(|| {
        Ok(Box::new(MarkerEmbedder) as Box<dyn Embedder>)
    })))
}

#[tokio::test]
async fn search_before_indexing_is_an_error() {
    let store = marker_store();
    assert!(matches!(store.search("alpha", 5).await, Err(Error::NotIndexed)));
    assert!(matches!(store.hybrid_search("alpha", 5).await, Err(Error::NotIndexed)));
}

#[tokio::test]
async fn stats_track_index_state() {
    let store = marker_store();
    let before = store.stats();
    assert!(!before.is_indexed);
    assert_eq!(before.chunk_count, 0);
    assert_eq!(before.dimension, 0);

    store
        .add_chunks(vec![chunk("alpha"), chunk("beta")])
        .await
        .expect("index");

    let after = store.stats();
    assert!(after.is_indexed);
    assert_eq!(after.chunk_count, 2);
    assert_eq!(after.dimension, 3);
}

#[tokio::test]
async fn threshold_is_strictly_above() {
    let store = marker_store();
    store
        .add_chunks(vec![chunk("alpha one"), chunk("edge case"), chunk("blend mix")])
        .await
        .expect("index");

    let results = store.search("alpha", 10).await.expect("search");
    let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["alpha one", "blend mix"], "below-threshold chunk is dropped");
    assert!((results[0].score - 1.0).abs() < 1e-5);
    assert!((results[1].score - 0.6).abs() < 1e-5);
    for r in &results {
        assert!(r.score > 0.3);
    }
}

#[tokio::test]
async fn ties_keep_insertion_order() {
    let store = marker_store();
    store
        .add_chunks(vec![chunk("alpha first"), chunk("alpha second")])
        .await
        .expect("index");

    let results = store.search("alpha", 5).await.expect("search");
    assert_eq!(results[0].chunk.text, "alpha first");
    assert_eq!(results[1].chunk.text, "alpha second");
}

#[tokio::test]
async fn rejected_query_degrades_to_no_results() {
    let store = marker_store();
    store.add_chunks(vec![chunk("alpha")]).await.expect("index");

    // The backend rejects this text; the query embeds to a zero vector
    // and similarity is 0 everywhere, which the threshold filters out.
    let results = store.search("reject this", 5).await.expect("search");
    assert!(results.is_empty());
}

#[tokio::test]
async fn failed_chunk_embedding_still_indexes() {
    let store = marker_store();
    store
        .add_chunks(vec![chunk("reject me"), chunk("alpha ok")])
        .await
        .expect("index despite per-item failure");

    let stats = store.stats();
    assert_eq!(stats.chunk_count, 2, "zero-vector fallback keeps 1:1 pairing");

    let results = store.search("alpha", 5).await.expect("search");
    assert_eq!(results.len(), 1, "the degraded chunk matches nothing");
    assert_eq!(results[0].chunk.text, "alpha ok");
}

#[tokio::test]
async fn hybrid_boosts_per_term_occurrence_and_caps() {
    let store = marker_store();
    store
        .add_chunks(vec![chunk("blend shuttle schedule")])
        .await
        .expect("index");

    // An "alpha" query scores the chunk at 0.6 in the vector phase;
    // the matching term "shuttle" then adds 0.2.
    let results = store.hybrid_search("alpha shuttle", 5).await.expect("hybrid");
    assert!((results[0].score - 0.8).abs() < 1e-5);

    // A repeated query term boosts once per occurrence: 0.6 + 0.2 + 0.2
    let results = store.hybrid_search("alpha shuttle shuttle", 5).await.expect("hybrid");
    assert!((results[0].score - 1.0).abs() < 1e-5);

    // Terms of length <= 2 are ignored: no boost at all here
    let results = store.hybrid_search("alpha of it", 5).await.expect("hybrid");
    assert!((results[0].score - 0.6).abs() < 1e-5);

    // Three matching terms would reach 1.2; the score caps at 1.0
    let results = store
        .hybrid_search("alpha blend shuttle schedule", 5)
        .await
        .expect("hybrid");
    assert!(results[0].score <= 1.0);
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn hybrid_respects_top_k_and_score_range() {
    let store = marker_store();
    store
        .add_chunks(vec![
            chunk("alpha a"),
            chunk("alpha b"),
            chunk("alpha c"),
            chunk("blend d"),
        ])
        .await
        .expect("index");

    let results = store.hybrid_search("alpha", 2).await.expect("hybrid");
    assert_eq!(results.len(), 2);
    for r in &results {
        assert!(r.score >= 0.0 && r.score <= 1.0);
    }
}

#[tokio::test]
async fn reindex_replaces_contents_wholesale() {
    let store = marker_store();
    store
        .add_chunks(vec![chunk("alpha old"), chunk("beta old")])
        .await
        .expect("first build");
    store.add_chunks(vec![chunk("alpha new")]).await.expect("rebuild");

    let stats = store.stats();
    assert_eq!(stats.chunk_count, 1);
    let results = store.search("alpha", 5).await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.text, "alpha new");
}

#[tokio::test]
async fn backend_load_failure_is_an_indexing_error() {
    let store = VectorStore::new(Arc::new(SharedEmbedder::new(|| {
        Err(anyhow!("model files missing"))
    })));

    let err = store.add_chunks(vec![chunk("alpha")]).await.expect_err("fails");
    assert!(matches!(err, Error::Indexing(_)));
    assert!(!store.stats().is_indexed, "prior (empty) state retained");
}

#[test]
fn cosine_similarity_properties() {
    let v = vec![0.3f32, -1.2, 2.5];
    assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);

    let zero = vec![0.0f32; 3];
    assert_eq!(cosine_similarity(&v, &zero), 0.0);
    assert_eq!(cosine_similarity(&zero, &zero), 0.0);

    // mismatched lengths are defined as 0, not a panic
    assert_eq!(cosine_similarity(&v, &[1.0, 0.0]), 0.0);
}

#[test]
fn index_enforces_equal_lengths() {
    let err = VectorIndex::new(vec![chunk("alpha")], vec![]).expect_err("mismatch");
    assert!(matches!(err, Error::Indexing(_)));

    let index = VectorIndex::new(vec![chunk("alpha")], vec![vec![1.0, 0.0]]).expect("ok");
    assert_eq!(index.len(), 1);
    assert_eq!(index.dimension(), 2);
    assert!(!index.is_empty());
}
