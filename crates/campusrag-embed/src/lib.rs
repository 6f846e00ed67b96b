#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! campusrag-embed
//!
//! Embedding backends and the shared embedder front. The MiniLM backend
//! runs sentence-transformers all-MiniLM-L6-v2 locally via candle; the
//! hashing backend is a deterministic stand-in for offline runs and
//! tests, selected with `APP_USE_FAKE_EMBEDDINGS=1`.

pub mod device;
pub mod hashing;
pub mod model;
pub mod pool;
pub mod shared;
pub mod tokenize;

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use campusrag_core::traits::Embedder;

pub use hashing::HashedEmbedder;
pub use model::{MiniLmEmbedder, EMBEDDING_DIM};
pub use pool::masked_mean_normalize;
pub use shared::{EmbedderState, SharedEmbedder};

/// Build the backend the process should use: the hashing backend when
/// `APP_USE_FAKE_EMBEDDINGS` is set, the local MiniLM model otherwise.
pub fn default_backend() -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        tracing::info!("using hashing embedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Box::new(HashedEmbedder::new(EMBEDDING_DIM)));
    }
    Ok(Box::new(MiniLmEmbedder::load(&resolve_model_dir()?)?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let root = Path::new("../models/all-MiniLM-L6-v2");
    if root.exists() {
        return Ok(root.to_path_buf());
    }
    let legacy = Path::new("models/all-MiniLM-L6-v2");
    if legacy.exists() {
        return Ok(legacy.to_path_buf());
    }
    Err(anyhow!("could not locate all-MiniLM-L6-v2 model directory; set APP_MODEL_DIR"))
}
