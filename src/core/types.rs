use serde::{Deserialize, Serialize};

/// Dense document number assigned during one build, starting at 1.
/// Distinct from the external `docid` string the corpus carries.
pub type DocNum = u32;

/// One corpus record as supplied by the corpus shards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub docid: String,
    pub title: String,
    pub text: String,
}

/// Forward index record: docnum -> (docid, title).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardEntry {
    pub docnum: DocNum,
    pub docid: String,
    pub title: String,
}

/// Vocabulary record locating a term's block inside postings.bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub term: String,
    pub doc_freq: u32,
    pub offset: u64,
    pub length: u64,
}
