use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// The shared term normalizer.
///
/// Every component that tokenizes text (builder, verifier, query-side
/// tooling) links against this one implementation, so the same input
/// always yields the same token sequence. Stateless and deterministic.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pub lowercase: bool,
    pub max_token_length: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            lowercase: true,
            max_token_length: 255,
        }
    }
}

impl Tokenizer {
    /// Map raw document text to an ordered sequence of normalized tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);

        normalized
            .unicode_words()
            .filter(|w| w.len() <= self.max_token_length)
            .map(str::to_string)
            .collect()
    }

    /// NFC-normalize, casefold and fold typographic dashes so token
    /// shapes are stable across corpus encodings.
    fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.nfc() {
            match ch {
                // Soft hyphen and zero-width characters break word
                // segmentation mid-token
                '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => {}
                '\u{00A0}' | '\u{202F}' => out.push(' '),
                '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
                _ => {
                    if self.lowercase {
                        out.extend(ch.to_lowercase());
                    } else {
                        out.push(ch);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        let tok = Tokenizer::default();
        assert_eq!(
            tok.tokenize("Hello, World! foo_bar"),
            vec!["hello", "world", "foo_bar"]
        );
    }

    #[test]
    fn lowercases_cyrillic() {
        let tok = Tokenizer::default();
        assert_eq!(tok.tokenize("Москва КИНО"), vec!["москва", "кино"]);
    }

    #[test]
    fn folds_invisible_characters() {
        let tok = Tokenizer::default();
        // Soft hyphen inside a word must not split it
        assert_eq!(tok.tokenize("ki\u{00AD}no"), vec!["kino"]);
        assert_eq!(tok.tokenize("a\u{00A0}b"), vec!["a", "b"]);
    }

    #[test]
    fn keeps_internal_apostrophes() {
        let tok = Tokenizer::default();
        assert_eq!(tok.tokenize("can't stop"), vec!["can't", "stop"]);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let tok = Tokenizer::default();
        let text = "Déjà vu — снова и снова";
        assert_eq!(tok.tokenize(text), tok.tokenize(text));
    }
}
