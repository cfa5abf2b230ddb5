use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable description of one build, persisted as `meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub docs_count: usize,
    pub unique_terms: usize,
    pub total_tokens: usize,
    pub created_at: DateTime<Utc>,
    /// Sample limit that was applied, if any.
    pub sample: Option<usize>,
    pub stemmed: bool,
    /// Variant directory name: "raw" or "stemmed".
    pub index_type: String,
    /// Name of the term transform the build ran with.
    pub transform: String,
    /// crc32 of the caller-supplied pipeline version; a reader comparing
    /// this against its own config can detect a stale index.
    pub pipeline_fingerprint: u32,
    /// Malformed corpus lines skipped during the build.
    pub skipped_lines: usize,
}
