#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! campusrag-chunk
//!
//! Turns raw corpus records into retrievable chunks with provenance
//! metadata. No I/O, no dedup; duplicate source records stay duplicate
//! chunks.

pub mod chunker;

pub use chunker::chunk_corpus;
