use rust_stemmers::{Algorithm, Stemmer};

use crate::analysis::stopwords;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::Tokenizer;

/// Text analysis pipeline: Unicode segmentation, lowercasing, stop-word
/// filtering, Porter stemming.
///
/// Both the indexer and the query side normalize through the same
/// analyzer, so a query term always meets the canonical form stored in
/// the trie.
pub struct Analyzer {
    tokenizer: Tokenizer,
    stemmer: Stemmer,
}

impl Analyzer {
    pub fn english() -> Self {
        Analyzer {
            tokenizer: Tokenizer,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Split text into segments. Offsets are byte offsets into `text`;
    /// non-word segments are reported so offsets stay contiguous.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenizer.tokenize(text)
    }

    /// Canonicalize one token. Returns `None` for stop words.
    pub fn normalize(&self, token: &str) -> Option<String> {
        let lowered = token.to_lowercase();
        if stopwords::is_stop_word(&lowered) {
            return None;
        }
        Some(self.stemmer.stem(&lowered).into_owned())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::english()
    }
}
