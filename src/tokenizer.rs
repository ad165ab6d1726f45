use std::error::Error;
use std::fmt;

use regex::Regex;

/// A single `word/tag` token parsed from a tagged corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub word: String,
    pub tag: String,
}

/// An ordered sequence of token pairs; one corpus line becomes one sentence.
pub type Sentence = Vec<TokenPair>;

/// A whitespace-delimited chunk that did not split into word and tag parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedToken {
    pub line_number: usize,
    pub token: String,
}

impl fmt::Display for MalformedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: token '{}' has no '/' separator between word and tag",
            self.line_number, self.token
        )
    }
}

impl Error for MalformedToken {}

/// Tokenizer for raw tagged corpus text.
/// It parses `word/tag` tokens line by line into sentences, normalizing
/// literal commas so they cannot collide with field separators downstream.
pub struct Tokenizer {
    whitespace: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Creates a new instance of [`Tokenizer`].
    pub fn new() -> Self {
        Tokenizer {
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Parses raw corpus lines into sentences of `(word, tag)` pairs.
    ///
    /// Line-ending characters are stripped and lines that end up empty are
    /// dropped. Every literal `,` is replaced with the text `comma` before
    /// splitting; the substitution is lossy and deliberate, so the output
    /// vocabulary never contains a raw comma character. Each remaining token
    /// is split on its first `/` into word and tag.
    ///
    /// # Errors
    /// Returns a [`MalformedToken`] error for the first token that carries
    /// no `/` separator. Malformed input is never silently coerced.
    pub fn parse(&self, lines: &[String]) -> Result<Vec<Sentence>, MalformedToken> {
        let mut sentences = Vec::new();

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            let line = line.replace(',', "comma");

            let mut sentence = Sentence::new();
            for token in self.whitespace.split(&line).filter(|t| !t.is_empty()) {
                let (word, tag) = token.split_once('/').ok_or_else(|| MalformedToken {
                    line_number: idx + 1,
                    token: token.to_string(),
                })?;
                sentence.push(TokenPair {
                    word: word.to_string(),
                    tag: tag.to_string(),
                });
            }
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
        }

        Ok(sentences)
    }
}
