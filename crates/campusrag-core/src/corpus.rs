//! Corpus record types as they arrive from the JSON source files.
//!
//! The pipeline consumes these records; it does not own their on-disk
//! format. Parsing happens at the caller boundary (CLI, server).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One topic/answer record from `knowledge.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub topic: String,
    pub questions: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
}

/// Details of a single campus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusInfo {
    /// Aliases the campus is known by.
    #[serde(default)]
    pub name: Option<Vec<String>>,
    #[serde(default)]
    pub gate_closing_time: Option<String>,
    #[serde(default)]
    pub dorm_types: Option<Vec<String>>,
    #[serde(default)]
    pub utilities: Option<Vec<String>>,
    /// Place name -> maps link. Placeholder values mark unset entries.
    /// BTreeMap keeps place iteration (and chunk emission) deterministic.
    #[serde(default)]
    pub map: Option<BTreeMap<String, String>>,
}

/// One record from `locations.json`: a single-key mapping of campus
/// name to its details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRecord(pub BTreeMap<String, CampusInfo>);

/// The whole fixed corpus, already parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub knowledge: Vec<KnowledgeRecord>,
    pub locations: Vec<LocationRecord>,
}

impl Corpus {
    /// Parse the two source documents into a corpus.
    pub fn from_json(knowledge_json: &str, locations_json: &str) -> anyhow::Result<Self> {
        let knowledge: Vec<KnowledgeRecord> = serde_json::from_str(knowledge_json)?;
        let locations: Vec<LocationRecord> = serde_json::from_str(locations_json)?;
        Ok(Self { knowledge, locations })
    }
}
