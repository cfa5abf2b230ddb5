/// Build-time configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Stop after this many documents (None = full corpus).
    pub sample: Option<usize>,
    /// Apply the rule-based term transform before indexing.
    pub stem: bool,
    /// Caller-supplied version of the tokenize/transform pipeline.
    /// Recorded in meta.json so stale indexes can be detected without
    /// hashing source files.
    pub pipeline_version: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            sample: None,
            stem: false,
            pipeline_version: "1".to_string(),
        }
    }
}

impl BuildConfig {
    /// Directory name of the index variant this config produces.
    pub fn variant(&self) -> &'static str {
        if self.stem { "stemmed" } else { "raw" }
    }

    /// Fingerprint of the active pipeline, stored in build metadata.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(self.pipeline_version.as_bytes());
        hasher.update(self.variant().as_bytes());
        hasher.finalize()
    }
}
