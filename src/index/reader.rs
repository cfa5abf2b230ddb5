use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::sync::Mutex;

use log::{debug, warn};
use roaring::RoaringBitmap;

use crate::codec::postings::PostingsCodec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocNum, ForwardEntry, VocabEntry};
use crate::index::meta::IndexMeta;
use crate::storage::layout::IndexLayout;

/// Read-only view over one finished index variant.
///
/// Vocabulary, forward index, doclens and metadata are loaded up front;
/// postings blocks are fetched lazily by byte offset. The reader never
/// mutates the artifacts, so any number of readers may coexist.
pub struct IndexReader {
    vocab: HashMap<String, VocabEntry>,
    forward: BTreeMap<DocNum, ForwardEntry>,
    doclens: BTreeMap<DocNum, usize>,
    meta: IndexMeta,
    postings_file: Mutex<File>,
}

impl IndexReader {
    pub fn open(layout: &IndexLayout) -> Result<Self> {
        let vocab = load_vocab(layout)?;
        let forward = load_forward(layout)?;
        let doclens = load_doclens(layout)?;
        let meta = load_meta(layout)?;
        let postings_file = File::open(layout.postings_path()).map_err(|e| {
            Error::new(
                ErrorKind::NotFound,
                format!(
                    "postings store missing at {}: {}",
                    layout.postings_path().display(),
                    e
                ),
            )
        })?;

        debug!(
            "opened index {}: terms={}, docs={}",
            layout.dir.display(),
            vocab.len(),
            forward.len()
        );
        Ok(IndexReader {
            vocab,
            forward,
            doclens,
            meta,
            postings_file: Mutex::new(postings_file),
        })
    }

    /// Decode the posting list for a term. An unknown term resolves to
    /// an empty list, not an error.
    pub fn postings(&self, term: &str) -> Result<Vec<DocNum>> {
        let entry = match self.vocab.get(term) {
            Some(entry) => entry,
            None => return Ok(Vec::new()),
        };

        let mut block = vec![0u8; entry.length as usize];
        {
            let mut file = self
                .postings_file
                .lock()
                .map_err(|_| Error::new(ErrorKind::Io, "postings file lock poisoned"))?;
            file.seek(SeekFrom::Start(entry.offset))?;
            file.read_exact(&mut block).map_err(|e| {
                Error::new(
                    ErrorKind::Corrupt,
                    format!("short read for term '{}': {}", entry.term, e),
                )
            })?;
        }

        PostingsCodec::decode(&block)
    }

    pub fn vocab_entry(&self, term: &str) -> Option<&VocabEntry> {
        self.vocab.get(term)
    }

    /// All vocabulary entries, in no particular order.
    pub fn vocab_entries(&self) -> impl Iterator<Item = &VocabEntry> {
        self.vocab.values()
    }

    pub fn doc(&self, docnum: DocNum) -> Option<&ForwardEntry> {
        self.forward.get(&docnum)
    }

    pub fn doc_len(&self, docnum: DocNum) -> Option<usize> {
        self.doclens.get(&docnum).copied()
    }

    pub fn doc_count(&self) -> usize {
        self.forward.len()
    }

    pub fn term_count(&self) -> usize {
        self.vocab.len()
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// The universal docnum set, the domain for logical negation.
    pub fn universe(&self) -> RoaringBitmap {
        self.forward.keys().copied().collect()
    }
}

fn load_vocab(layout: &IndexLayout) -> Result<HashMap<String, VocabEntry>> {
    let path = layout.vocab_path();
    let file = File::open(&path).map_err(|e| {
        Error::new(
            ErrorKind::NotFound,
            format!("vocabulary missing at {}: {}", path.display(), e),
        )
    })?;

    let mut vocab = HashMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let parsed = match fields.as_slice() {
            [term, df, offset, length] => {
                match (df.parse(), offset.parse(), length.parse()) {
                    (Ok(doc_freq), Ok(offset), Ok(length)) => Some(VocabEntry {
                        term: term.to_string(),
                        doc_freq,
                        offset,
                        length,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };
        match parsed {
            Some(entry) => {
                vocab.insert(entry.term.clone(), entry);
            }
            None => warn!("skipping malformed vocab line: {:?}", line),
        }
    }
    Ok(vocab)
}

fn load_forward(layout: &IndexLayout) -> Result<BTreeMap<DocNum, ForwardEntry>> {
    let path = layout.forward_path();
    let file = File::open(&path).map_err(|e| {
        Error::new(
            ErrorKind::NotFound,
            format!("forward index missing at {}: {}", path.display(), e),
        )
    })?;

    let mut forward = BTreeMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        let parsed = match (fields.next(), fields.next(), fields.next()) {
            (Some(docnum), Some(docid), Some(title)) => {
                docnum.parse::<DocNum>().ok().map(|docnum| ForwardEntry {
                    docnum,
                    docid: docid.to_string(),
                    title: title.to_string(),
                })
            }
            _ => None,
        };
        match parsed {
            Some(entry) => {
                forward.insert(entry.docnum, entry);
            }
            None => warn!("skipping malformed forward line: {:?}", line),
        }
    }
    Ok(forward)
}

fn load_doclens(layout: &IndexLayout) -> Result<BTreeMap<DocNum, usize>> {
    let file = File::open(layout.doclens_path())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn load_meta(layout: &IndexLayout) -> Result<IndexMeta> {
    let file = File::open(layout.meta_path())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
