#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! campusrag-store
//!
//! In-memory vector store over chunk/embedding pairs: exact cosine
//! scoring with a relevance threshold, plus hybrid re-ranking that
//! boosts lexical term matches on top of the vector phase.

pub mod index;
pub mod store;

pub use index::{cosine_similarity, VectorIndex};
pub use store::{VectorStore, SCORE_THRESHOLD, TERM_BOOST};
