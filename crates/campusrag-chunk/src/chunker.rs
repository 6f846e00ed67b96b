use uuid::Uuid;

use campusrag_core::corpus::{CampusInfo, Corpus, KnowledgeRecord};
use campusrag_core::types::{Chunk, ChunkKind, ChunkMetadata};

/// Source document names carried into chunk provenance.
const KNOWLEDGE_SOURCE: &str = "knowledge.json";
const LOCATIONS_SOURCE: &str = "locations.json";

/// Marker used by the corpus for map links that were never filled in.
const UNSET_LINK: &str = "...";

/// Rendering for absent optional fields. Missing data becomes text,
/// never a panic.
const NOT_SPECIFIED: &str = "Not specified";

/// Split the corpus into retrievable chunks.
///
/// Each knowledge record yields one topic summary chunk plus one chunk per
/// question restating question+answer, so the same answer is reachable
/// under every phrasing the embedding model can match. Each location
/// record yields a campus overview chunk plus one chunk per mapped place
/// with a real link.
pub fn chunk_corpus(corpus: &Corpus) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for record in &corpus.knowledge {
        knowledge_chunks(record, &mut chunks);
    }
    for record in &corpus.locations {
        for (campus_name, info) in &record.0 {
            location_chunks(campus_name, info, &mut chunks);
        }
    }
    chunks
}

fn knowledge_chunks(record: &KnowledgeRecord, out: &mut Vec<Chunk>) {
    out.push(Chunk {
        id: Uuid::new_v4().to_string(),
        text: format!(
            "Topic: {}\n\nAnswer: {}\n\nSynonyms: {}",
            record.topic,
            record.answer,
            join_or_placeholder(record.synonyms.as_deref()),
        ),
        metadata: ChunkMetadata {
            kind: ChunkKind::Knowledge,
            source: KNOWLEDGE_SOURCE.to_string(),
            topic: Some(record.topic.clone()),
            campus: None,
            place: None,
        },
    });

    for question in &record.questions {
        out.push(Chunk {
            id: Uuid::new_v4().to_string(),
            text: format!("Question: {}\n\nAnswer: {}", question, record.answer),
            metadata: ChunkMetadata {
                kind: ChunkKind::Question,
                source: KNOWLEDGE_SOURCE.to_string(),
                topic: Some(record.topic.clone()),
                campus: None,
                place: None,
            },
        });
    }
}

fn location_chunks(campus_name: &str, info: &CampusInfo, out: &mut Vec<Chunk>) {
    out.push(Chunk {
        id: Uuid::new_v4().to_string(),
        text: format!(
            "Campus: {}\nAliases: {}\nGate Closing: {}\nDorm Types: {}\nUtilities: {}",
            campus_name,
            join_or_placeholder(info.name.as_deref()),
            info.gate_closing_time.as_deref().unwrap_or(NOT_SPECIFIED),
            join_or_placeholder(info.dorm_types.as_deref()),
            join_or_placeholder(info.utilities.as_deref()),
        ),
        metadata: ChunkMetadata {
            kind: ChunkKind::Location,
            source: LOCATIONS_SOURCE.to_string(),
            topic: None,
            campus: Some(campus_name.to_string()),
            place: None,
        },
    });

    let Some(map) = &info.map else { return };
    for (place, link) in map {
        if link.is_empty() || link == UNSET_LINK {
            continue;
        }
        out.push(Chunk {
            id: Uuid::new_v4().to_string(),
            text: format!(
                "Place: {}\nCampus: {}\nGoogle Maps Link: {}\nAddress: See link for exact location",
                place, campus_name, link,
            ),
            metadata: ChunkMetadata {
                kind: ChunkKind::MapLocation,
                source: LOCATIONS_SOURCE.to_string(),
                topic: None,
                campus: Some(campus_name.to_string()),
                place: Some(place.clone()),
            },
        });
    }
}

fn join_or_placeholder(values: Option<&[String]>) -> String {
    match values {
        Some(v) if !v.is_empty() => v.join(", "),
        _ => NOT_SPECIFIED.to_string(),
    }
}
