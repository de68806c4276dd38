use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenKind};

/// Unicode word-boundary tokenizer.
///
/// Every segment of the input is reported, including punctuation and
/// whitespace, so that byte offsets line up with the original field
/// value. Only `TokenKind::Word` segments produce terms downstream.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_word_bound_indices()
            .map(|(offset, segment)| Token::new(segment, offset, classify(segment)))
            .collect()
    }
}

fn classify(segment: &str) -> TokenKind {
    let mut chars = segment.chars();
    if chars.clone().any(|c| c.is_alphabetic()) {
        TokenKind::Word
    } else if chars.clone().any(|c| c.is_numeric()) {
        TokenKind::Number
    } else if chars.all(|c| c.is_whitespace()) {
        TokenKind::Whitespace
    } else {
        TokenKind::Punctuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_and_kinds() {
        let tokens = Tokenizer.tokenize("spider man, 7 webs");

        let words: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .collect();
        assert_eq!(words.len(), 3);

        assert_eq!(words[0].text, "spider");
        assert_eq!(words[0].offset, 0);
        assert_eq!(words[0].length, 6);

        assert_eq!(words[1].text, "man");
        assert_eq!(words[1].offset, 7);

        assert_eq!(words[2].text, "webs");
        assert_eq!(words[2].offset, 14);

        assert!(tokens.iter().any(|t| t.kind == TokenKind::Number && t.text == "7"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Punctuation && t.text == ","));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Whitespace));
    }

    #[test]
    fn test_hyphenated_words_split() {
        let tokens = Tokenizer.tokenize("spider-man");
        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(words, vec!["spider", "man"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(Tokenizer.tokenize("").is_empty());
    }
}
