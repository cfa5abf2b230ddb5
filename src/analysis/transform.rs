use rust_stemmers::{Algorithm, Stemmer};

/// Term normalization applied after tokenization, selected at build time.
///
/// The active variant's name is recorded in build metadata so verify and
/// query tooling can reproduce the build-time pipeline exactly.
pub trait TermTransform: Send + Sync {
    fn apply(&self, token: &str) -> String;

    fn name(&self) -> &str;
}

/// Pass tokens through unchanged (the `raw` index variant).
pub struct Identity;

impl TermTransform for Identity {
    fn apply(&self, token: &str) -> String {
        token.to_string()
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Rule-based Snowball stemming (the `stemmed` index variant).
pub struct SnowballStem {
    stemmer: Stemmer,
    name: &'static str,
}

impl SnowballStem {
    pub fn new(algorithm: Algorithm) -> Self {
        let name = match algorithm {
            Algorithm::English => "snowball_english",
            Algorithm::Russian => "snowball_russian",
            _ => "snowball",
        };
        SnowballStem {
            stemmer: Stemmer::create(algorithm),
            name,
        }
    }
}

impl TermTransform for SnowballStem {
    fn apply(&self, token: &str) -> String {
        self.stemmer.stem(token).to_string()
    }

    fn name(&self) -> &str {
        self.name
    }
}
