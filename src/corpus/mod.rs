use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;

use log::{debug, info};

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Document;

/// Corpus directory of tab-separated shard files (`part_*.tsv`).
///
/// Shards are read in lexicographic file-name order; documents are
/// logically concatenated across shards in that order.
pub struct CorpusReader {
    dir: PathBuf,
}

impl CorpusReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CorpusReader { dir: dir.into() }
    }

    /// Shard files in iteration order. An unreadable directory is fatal.
    pub fn shards(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("corpus directory not found: {}", self.dir.display()),
            ));
        }

        let mut shards = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with("part_") && name.ends_with(".tsv") {
                    shards.push(path);
                }
            }
        }
        shards.sort();
        Ok(shards)
    }

    /// Iterate documents across all shards in corpus order.
    pub fn documents(&self) -> Result<DocumentIter> {
        let mut shards = self.shards()?;
        shards.reverse(); // Pop from the back
        Ok(DocumentIter {
            shards,
            current: None,
            skipped_lines: 0,
        })
    }

    /// docid -> text map over the whole corpus, for the verifier.
    pub fn texts_by_docid(&self) -> Result<HashMap<String, String>> {
        let mut texts = HashMap::new();
        let mut iter = self.documents()?;
        for doc in &mut iter {
            let doc = doc?;
            texts.insert(doc.docid, doc.text);
        }
        info!(
            "loaded corpus texts: docs={}, skipped_lines={}",
            texts.len(),
            iter.skipped_lines
        );
        Ok(texts)
    }
}

/// Streaming document iterator over the corpus shards.
pub struct DocumentIter {
    shards: Vec<PathBuf>,
    current: Option<Lines<BufReader<File>>>,
    /// Malformed records seen so far (wrong field count). Header and
    /// blank lines are expected and not counted here.
    pub skipped_lines: usize,
}

impl DocumentIter {
    fn open_next_shard(&mut self) -> Result<bool> {
        match self.shards.pop() {
            Some(path) => {
                debug!("reading corpus shard {}", path.display());
                let file = File::open(&path).map_err(|e| {
                    Error::new(
                        ErrorKind::Io,
                        format!("cannot open shard {}: {}", path.display(), e),
                    )
                })?;
                self.current = Some(BufReader::new(file).lines());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Iterator for DocumentIter {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let lines = match &mut self.current {
                Some(lines) => lines,
                None => match self.open_next_shard() {
                    Ok(true) => continue,
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                },
            };

            match lines.next() {
                Some(Ok(line)) => match parse_record(&line) {
                    ParsedLine::Doc(doc) => return Some(Ok(doc)),
                    ParsedLine::Skip => continue,
                    ParsedLine::Malformed => {
                        self.skipped_lines += 1;
                        debug!("skipping malformed corpus line: {:?}", truncate(&line));
                        continue;
                    }
                },
                Some(Err(e)) => return Some(Err(e.into())),
                None => {
                    self.current = None;
                    continue;
                }
            }
        }
    }
}

enum ParsedLine {
    Doc(Document),
    Skip,
    Malformed,
}

/// Parse one `docid \t title \t text` record. The text field may contain
/// anything but a literal tab, so only the first two tabs split.
fn parse_record(line: &str) -> ParsedLine {
    if line.is_empty() {
        return ParsedLine::Skip;
    }

    let mut fields = line.splitn(3, '\t');
    let (docid, title, text) = match (fields.next(), fields.next(), fields.next()) {
        (Some(d), Some(t), Some(x)) => (d, t, x),
        _ => return ParsedLine::Malformed,
    };

    if is_header_field(docid) {
        return ParsedLine::Skip;
    }

    ParsedLine::Doc(Document {
        docid: docid.to_string(),
        title: title.to_string(),
        text: text.to_string(),
    })
}

fn is_header_field(field: &str) -> bool {
    matches!(
        field.to_lowercase().as_str(),
        "id" | "docid" | "document_id"
    )
}

fn truncate(line: &str) -> &str {
    let end = line
        .char_indices()
        .nth(60)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn write_shard(dir: &Path, name: &str, content: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn reads_shards_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_shard(dir.path(), "part_0002.tsv", "d3\tt3\tthird\n");
        write_shard(dir.path(), "part_0001.tsv", "d1\tt1\tfirst\nd2\tt2\tsecond\n");
        write_shard(dir.path(), "notes.txt", "ignored\n");

        let reader = CorpusReader::new(dir.path());
        let docs: Vec<Document> = reader
            .documents()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.docid.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn skips_headers_and_counts_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_shard(
            dir.path(),
            "part_0001.tsv",
            "DocID\ttitle\ttext\nbroken line\n\nd1\tt1\tbody text\n",
        );

        let reader = CorpusReader::new(dir.path());
        let mut iter = reader.documents().unwrap();
        let docs: Vec<Document> = (&mut iter).collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].docid, "d1");
        assert_eq!(iter.skipped_lines, 1);
    }

    #[test]
    fn text_field_may_contain_extra_structure() {
        let dir = tempfile::tempdir().unwrap();
        write_shard(dir.path(), "part_0001.tsv", "d1\tt1\ta: b, c: d\n");

        let reader = CorpusReader::new(dir.path());
        let docs: Vec<Document> = reader
            .documents()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(docs[0].text, "a: b, c: d");
    }

    #[test]
    fn missing_directory_is_fatal() {
        let reader = CorpusReader::new("/nonexistent/corpus");
        assert!(reader.documents().is_err());
    }
}
