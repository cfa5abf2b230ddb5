use std::fs;
use std::path::PathBuf;

use crate::core::error::Result;

/// Directory structure for one index variant (`raw/` or `stemmed/`).
///
/// One builder writes the five artifacts sequentially; afterwards the
/// directory is read-only and any number of readers may use it.
#[derive(Debug, Clone)]
pub struct IndexLayout {
    pub dir: PathBuf,
}

impl IndexLayout {
    /// Open an existing variant directory without touching it.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        IndexLayout { dir: dir.into() }
    }

    /// Create the variant directory for a fresh build.
    pub fn create(root: impl Into<PathBuf>, variant: &str) -> Result<Self> {
        let dir = root.into().join(variant);
        fs::create_dir_all(&dir)?;
        Ok(IndexLayout { dir })
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.dir.join("vocab.tsv")
    }

    pub fn postings_path(&self) -> PathBuf {
        self.dir.join("postings.bin")
    }

    pub fn forward_path(&self) -> PathBuf {
        self.dir.join("forward.tsv")
    }

    pub fn doclens_path(&self) -> PathBuf {
        self.dir.join("doclens.json")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join("meta.json")
    }
}
