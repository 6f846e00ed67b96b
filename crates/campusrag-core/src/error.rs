use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("vector store not indexed")]
    NotIndexed,

    #[error("index build failed: {0}")]
    Indexing(String),

    #[error("embedding failed: {0}")]
    Embedding(String),
}

pub type Result<T> = std::result::Result<T, Error>;
