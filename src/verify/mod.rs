use std::collections::HashMap;

use log::{info, warn};

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::transform::TermTransform;
use crate::core::error::Result;
use crate::corpus::CorpusReader;
use crate::index::reader::IndexReader;

/// How many postings of each sampled term are cross-checked against the
/// corpus. Full verification is O(total postings); this keeps a verify
/// run cheap while still catching codec and normalization bugs.
const POSTINGS_PER_TERM: usize = 100;

/// Outcome of one verification run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyReport {
    /// Terms sampled (top-k by document frequency).
    pub terms_checked: usize,
    /// Individual postings cross-checked against re-tokenized text.
    pub postings_checked: usize,
    /// Postings whose document did not contain the term, plus postings
    /// pointing at unknown docnums or docids.
    pub mismatches: usize,
    /// Terms whose decoded posting count differed from the vocabulary's
    /// recorded document frequency.
    pub df_warnings: usize,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches == 0 && self.df_warnings == 0
    }
}

/// Cross-check decoded postings against re-tokenized source text.
///
/// Samples the `top_k` highest-df terms, decodes each posting list and
/// asserts that every listed document (up to a bounded prefix) actually
/// contains the term after running the same tokenizer and transform the
/// index was built with. A regression oracle for the codec, the builder
/// and normalization drift.
pub fn verify(
    reader: &IndexReader,
    corpus: &CorpusReader,
    tokenizer: &Tokenizer,
    transform: &dyn TermTransform,
    top_k: usize,
) -> Result<VerifyReport> {
    let texts = corpus.texts_by_docid()?;

    let mut entries: Vec<_> = reader.vocab_entries().collect();
    entries.sort_by(|a, b| b.doc_freq.cmp(&a.doc_freq).then(a.term.cmp(&b.term)));
    entries.truncate(top_k);

    let mut report = VerifyReport::default();
    let mut transform_cache: HashMap<String, String> = HashMap::new();

    for entry in entries {
        report.terms_checked += 1;
        let docs = reader.postings(&entry.term)?;

        if docs.len() != entry.doc_freq as usize {
            warn!(
                "df mismatch for '{}': vocab {} vs decoded {}",
                entry.term,
                entry.doc_freq,
                docs.len()
            );
            report.df_warnings += 1;
        }

        for &docnum in docs.iter().take(POSTINGS_PER_TERM) {
            report.postings_checked += 1;

            let forward = match reader.doc(docnum) {
                Some(forward) => forward,
                None => {
                    warn!("docnum {} for '{}' missing from forward index", docnum, entry.term);
                    report.mismatches += 1;
                    continue;
                }
            };
            let text = match texts.get(&forward.docid) {
                Some(text) => text,
                None => {
                    warn!(
                        "docid {} (docnum {}) missing from corpus",
                        forward.docid, docnum
                    );
                    report.mismatches += 1;
                    continue;
                }
            };

            let present = tokenizer.tokenize(text).iter().any(|token| {
                let term = transform_cache
                    .entry(token.clone())
                    .or_insert_with(|| transform.apply(token));
                *term == entry.term
            });
            if !present {
                warn!(
                    "term '{}' not found in docnum {} (docid {})",
                    entry.term, docnum, forward.docid
                );
                report.mismatches += 1;
            }
        }
    }

    info!(
        "verify finished: terms={}, postings={}, mismatches={}, df_warnings={}",
        report.terms_checked, report.postings_checked, report.mismatches, report.df_warnings
    );
    Ok(report)
}
