use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::transform::TermTransform;
use crate::codec::postings::PostingsCodec;
use crate::core::config::BuildConfig;
use crate::core::error::Result;
use crate::core::types::{DocNum, ForwardEntry};
use crate::corpus::CorpusReader;
use crate::index::meta::IndexMeta;
use crate::storage::layout::IndexLayout;

/// Totals of one finished build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub docs_count: usize,
    pub unique_terms: usize,
    pub total_tokens: usize,
    pub skipped_lines: usize,
    pub dir: PathBuf,
}

/// Builds one index variant from a corpus.
///
/// A build assigns dense docnums in corpus order, accumulates per-term
/// docnum lists (deduplicated per document), and writes the five index
/// artifacts. Builds are single-writer; a rebuild replaces every
/// artifact wholesale.
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    transform: Box<dyn TermTransform>,
    config: BuildConfig,
}

impl IndexBuilder {
    pub fn new(
        tokenizer: Tokenizer,
        transform: Box<dyn TermTransform>,
        config: BuildConfig,
    ) -> Self {
        IndexBuilder {
            tokenizer,
            transform,
            config,
        }
    }

    /// Run the build, writing artifacts under `root/<variant>/`.
    pub fn build(&self, corpus: &CorpusReader, root: &Path) -> Result<BuildSummary> {
        let layout = IndexLayout::create(root, self.config.variant())?;

        // BTreeMap keeps terms in lexicographic order, which fixes the
        // artifact emission order and makes rebuilds byte-identical.
        let mut postings: BTreeMap<String, Vec<DocNum>> = BTreeMap::new();
        let mut doclens: BTreeMap<DocNum, usize> = BTreeMap::new();
        let mut forward: Vec<ForwardEntry> = Vec::new();
        let mut transform_cache: HashMap<String, String> = HashMap::new();

        let mut docnum: DocNum = 0;
        let mut documents = corpus.documents()?;
        for doc in &mut documents {
            let doc = doc?;
            docnum += 1;

            let tokens = self.tokenizer.tokenize(&doc.text);
            doclens.insert(docnum, tokens.len());
            forward.push(ForwardEntry {
                docnum,
                docid: doc.docid,
                title: doc.title,
            });

            let mut seen: HashSet<&str> = HashSet::new();
            for token in &tokens {
                if !seen.insert(token) {
                    continue;
                }
                let term = self.normalize_term(token, &mut transform_cache);
                // Pure punctuation left over from tokenization is not an
                // indexable term
                if !term.chars().any(char::is_alphanumeric) {
                    continue;
                }
                // A term contributes at most one posting per document.
                // Distinct surface tokens may transform to the same term,
                // so the dedup has to happen on the transformed side.
                let list = postings.entry(term).or_default();
                if list.last() != Some(&docnum) {
                    list.push(docnum);
                }
            }

            if let Some(limit) = self.config.sample {
                if docnum as usize >= limit {
                    break;
                }
            }
        }

        let summary = BuildSummary {
            docs_count: docnum as usize,
            unique_terms: postings.len(),
            total_tokens: doclens.values().sum(),
            skipped_lines: documents.skipped_lines,
            dir: layout.dir.clone(),
        };

        self.write_forward(&layout, &forward)?;
        self.write_postings_and_vocab(&layout, &postings)?;
        self.write_doclens(&layout, &doclens)?;
        self.write_meta(&layout, &summary)?;

        info!(
            "index built: docs={}, terms={}, tokens={}, skipped_lines={}, dir={}",
            summary.docs_count,
            summary.unique_terms,
            summary.total_tokens,
            summary.skipped_lines,
            layout.dir.display()
        );
        Ok(summary)
    }

    /// Apply the term transform, memoized per surface token. The cache
    /// is an optimization only; results must equal uncached application.
    fn normalize_term(&self, token: &str, cache: &mut HashMap<String, String>) -> String {
        if let Some(cached) = cache.get(token) {
            return cached.clone();
        }
        let term = self.transform.apply(token);
        cache.insert(token.to_string(), term.clone());
        term
    }

    fn write_forward(&self, layout: &IndexLayout, forward: &[ForwardEntry]) -> Result<()> {
        let mut out = BufWriter::new(File::create(layout.forward_path())?);
        for entry in forward {
            writeln!(out, "{}\t{}\t{}", entry.docnum, entry.docid, entry.title)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write per-term blocks sequentially; the running byte position
    /// gives each vocab entry its (offset, length).
    fn write_postings_and_vocab(
        &self,
        layout: &IndexLayout,
        postings: &BTreeMap<String, Vec<DocNum>>,
    ) -> Result<()> {
        let mut postings_out = BufWriter::new(File::create(layout.postings_path())?);
        let mut vocab_out = BufWriter::new(File::create(layout.vocab_path())?);

        let mut offset = 0u64;
        for (term, docs) in postings {
            let block = PostingsCodec::encode(docs)?;
            postings_out.write_all(&block)?;
            writeln!(
                vocab_out,
                "{}\t{}\t{}\t{}",
                term,
                docs.len(),
                offset,
                block.len()
            )?;
            offset += block.len() as u64;
        }

        postings_out.flush()?;
        vocab_out.flush()?;
        Ok(())
    }

    fn write_doclens(&self, layout: &IndexLayout, doclens: &BTreeMap<DocNum, usize>) -> Result<()> {
        let mut out = BufWriter::new(File::create(layout.doclens_path())?);
        serde_json::to_writer_pretty(&mut out, doclens)?;
        out.flush()?;
        Ok(())
    }

    fn write_meta(&self, layout: &IndexLayout, summary: &BuildSummary) -> Result<()> {
        let meta = IndexMeta {
            docs_count: summary.docs_count,
            unique_terms: summary.unique_terms,
            total_tokens: summary.total_tokens,
            created_at: Utc::now(),
            sample: self.config.sample,
            stemmed: self.config.stem,
            index_type: self.config.variant().to_string(),
            transform: self.transform.name().to_string(),
            pipeline_fingerprint: self.config.fingerprint(),
            skipped_lines: summary.skipped_lines,
        };
        let mut out = BufWriter::new(File::create(layout.meta_path())?);
        serde_json::to_writer_pretty(&mut out, &meta)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::transform::Identity;
    use std::io::Write as _;

    fn corpus_with(lines: &str) -> (tempfile::TempDir, CorpusReader) {
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join("part_0001.tsv")).unwrap();
        f.write_all(lines.as_bytes()).unwrap();
        let reader = CorpusReader::new(dir.path());
        (dir, reader)
    }

    fn build(corpus: &CorpusReader, root: &Path, config: BuildConfig) -> BuildSummary {
        let builder = IndexBuilder::new(Tokenizer::default(), Box::new(Identity), config);
        builder.build(corpus, root).unwrap()
    }

    #[test]
    fn assigns_dense_docnums_and_counts_tokens() {
        let (_guard, corpus) = corpus_with("d1\tone\ta b\nd2\ttwo\tb c c\n");
        let root = tempfile::tempdir().unwrap();
        let summary = build(&corpus, root.path(), BuildConfig::default());

        assert_eq!(summary.docs_count, 2);
        assert_eq!(summary.total_tokens, 5);
        assert_eq!(summary.unique_terms, 3);

        let forward = std::fs::read_to_string(root.path().join("raw/forward.tsv")).unwrap();
        assert_eq!(forward, "1\td1\tone\n2\td2\ttwo\n");
    }

    #[test]
    fn deduplicates_terms_per_document() {
        let (_guard, corpus) = corpus_with("d1\tt\tword word word\n");
        let root = tempfile::tempdir().unwrap();
        build(&corpus, root.path(), BuildConfig::default());

        let vocab = std::fs::read_to_string(root.path().join("raw/vocab.tsv")).unwrap();
        assert_eq!(vocab, "word\t1\t0\t2\n");
    }

    #[test]
    fn vocab_is_sorted_with_contiguous_blocks() {
        let (_guard, corpus) = corpus_with("d1\tt\tzebra apple\nd2\tt\tapple\n");
        let root = tempfile::tempdir().unwrap();
        build(&corpus, root.path(), BuildConfig::default());

        let vocab = std::fs::read_to_string(root.path().join("raw/vocab.tsv")).unwrap();
        let rows: Vec<Vec<&str>> = vocab
            .lines()
            .map(|l| l.split('\t').collect())
            .collect();
        assert_eq!(rows[0][0], "apple");
        assert_eq!(rows[1][0], "zebra");

        // Blocks are adjacent: offset of the second equals offset+length
        // of the first, and the file ends at the last block boundary
        let first_end: u64 =
            rows[0][2].parse::<u64>().unwrap() + rows[0][3].parse::<u64>().unwrap();
        assert_eq!(first_end, rows[1][2].parse::<u64>().unwrap());
        let file_len = std::fs::metadata(root.path().join("raw/postings.bin"))
            .unwrap()
            .len();
        assert_eq!(
            file_len,
            rows[1][2].parse::<u64>().unwrap() + rows[1][3].parse::<u64>().unwrap()
        );
    }

    #[test]
    fn sample_limits_documents_only() {
        let (_guard, corpus) = corpus_with("d1\tt\ta\nd2\tt\tb\nd3\tt\tc\n");
        let root = tempfile::tempdir().unwrap();
        let summary = build(
            &corpus,
            root.path(),
            BuildConfig {
                sample: Some(2),
                ..BuildConfig::default()
            },
        );
        assert_eq!(summary.docs_count, 2);

        let vocab = std::fs::read_to_string(root.path().join("raw/vocab.tsv")).unwrap();
        assert!(!vocab.contains('c'));
    }

    #[test]
    fn stemming_collisions_within_a_document_collapse_to_one_posting() {
        use crate::analysis::transform::SnowballStem;
        use rust_stemmers::Algorithm;

        // "running" and "runs" both stem to "run"; one document must
        // still yield a single posting for the shared term
        let (_guard, corpus) = corpus_with("d1\tt\trunning runs\nd2\tt\truns\n");
        let root = tempfile::tempdir().unwrap();
        let builder = IndexBuilder::new(
            Tokenizer::default(),
            Box::new(SnowballStem::new(Algorithm::English)),
            BuildConfig {
                stem: true,
                ..BuildConfig::default()
            },
        );
        let summary = builder.build(&corpus, root.path()).unwrap();
        assert_eq!(summary.unique_terms, 1);

        let vocab = std::fs::read_to_string(root.path().join("stemmed/vocab.tsv")).unwrap();
        assert_eq!(vocab, "run\t2\t0\t3\n");
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let (_guard, corpus) =
            corpus_with("d1\tone\tкино и музыка\nd2\ttwo\tмузыка кино театр\n");
        let root_a = tempfile::tempdir().unwrap();
        let root_b = tempfile::tempdir().unwrap();
        build(&corpus, root_a.path(), BuildConfig::default());
        build(&corpus, root_b.path(), BuildConfig::default());

        for name in ["vocab.tsv", "postings.bin", "forward.tsv"] {
            let a = std::fs::read(root_a.path().join("raw").join(name)).unwrap();
            let b = std::fs::read(root_b.path().join("raw").join(name)).unwrap();
            assert_eq!(a, b, "artifact {} differs between rebuilds", name);
        }
    }
}
