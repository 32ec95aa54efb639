//! Text normalization and tokenization
//!
//! Cleaning removes URLs, e-mail addresses and digits and turns every
//! non-letter into whitespace. Tokens are then filtered according to a
//! [`TokenizationPolicy`]; n-grams are built from consecutive kept tokens.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::stopwords::is_stopword;
use super::{AnalysisResult, InvalidParameterError};

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"(?i)(?:https?://|www\.)\S*").expect("valid regex");
    static ref EMAIL_RE: Regex = Regex::new(r"\S+@\S+").expect("valid regex");
    static ref DIGITS_RE: Regex = Regex::new(r"\p{N}+").expect("valid regex");
    static ref NON_LETTER_RE: Regex = Regex::new(r"[^\p{L}\p{M}\s]+").expect("valid regex");
    static ref SENTENCE_RE: Regex = Regex::new(r"[.!?;\n]+").expect("valid regex");
}

/// How raw text becomes terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizationPolicy {
    /// Lowercase every token
    pub lowercase: bool,

    /// Remove diacritics ("economía" becomes "economia")
    pub strip_accents: bool,

    /// Drop Spanish stopwords and `extra_stopwords`
    pub remove_stopwords: bool,

    /// Additional lowercase words treated as stopwords
    pub extra_stopwords: Vec<String>,

    /// Minimum token length in characters
    pub min_token_length: usize,

    /// Longest n-gram emitted; 1 means unigrams only
    pub ngram_max: usize,
}

impl Default for TokenizationPolicy {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_accents: false,
            remove_stopwords: true,
            extra_stopwords: Vec::new(),
            min_token_length: 2,
            ngram_max: 1,
        }
    }
}

impl TokenizationPolicy {
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.min_token_length == 0 {
            return Err(InvalidParameterError::InvalidValue {
                name: "min_token_length",
                value: "0".to_string(),
            });
        }
        if self.ngram_max == 0 {
            return Err(InvalidParameterError::InvalidValue {
                name: "ngram_max",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Remove URLs, e-mail addresses, digits and punctuation, collapsing whitespace
#[must_use]
pub fn clean_text(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = DIGITS_RE.replace_all(&text, " ");
    let text = NON_LETTER_RE.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove combining marks after canonical decomposition
#[must_use]
pub fn strip_accents(word: &str) -> String {
    word.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Policy-driven tokenizer
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    policy: TokenizationPolicy,
    extra_stopwords: HashSet<String>,
}

impl Tokenizer {
    #[must_use]
    pub fn new(policy: TokenizationPolicy) -> Self {
        let extra_stopwords = policy
            .extra_stopwords
            .iter()
            .map(|w| w.to_lowercase())
            .collect();
        Self {
            policy,
            extra_stopwords,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &TokenizationPolicy {
        &self.policy
    }

    /// Unigrams surviving the policy, in document order
    fn unigrams(&self, text: &str) -> Vec<String> {
        let composed: String = text.nfc().collect();
        let cleaned = clean_text(&composed);

        cleaned
            .split_whitespace()
            .filter_map(|word| self.normalize_word(word))
            .collect()
    }

    fn normalize_word(&self, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        if self.policy.remove_stopwords
            && (is_stopword(&lower) || self.extra_stopwords.contains(&lower))
        {
            return None;
        }

        let mut token = if self.policy.lowercase {
            lower
        } else {
            word.to_string()
        };
        if self.policy.strip_accents {
            token = strip_accents(&token);
        }

        if token.chars().count() < self.policy.min_token_length {
            return None;
        }
        Some(token)
    }

    /// Terms of a text: unigrams followed by n-grams up to `ngram_max`
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let unigrams = self.unigrams(text);
        let mut terms = unigrams.clone();

        for n in 2..=self.policy.ngram_max {
            if unigrams.len() < n {
                break;
            }
            terms.extend(unigrams.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    /// Terms of every sentence, split on `. ! ? ;` and newlines
    ///
    /// URLs and e-mail addresses are removed before splitting so their dots
    /// do not create spurious sentences.
    #[must_use]
    pub fn tokenize_sentences(&self, text: &str) -> Vec<Vec<String>> {
        let text = URL_RE.replace_all(text, " ");
        let text = EMAIL_RE.replace_all(&text, " ");

        SENTENCE_RE
            .split(&text)
            .map(|sentence| self.tokenize(sentence))
            .filter(|terms| !terms.is_empty())
            .collect()
    }

    /// Normalize a user-supplied term the same way document text is
    ///
    /// Multi-word input is joined with single spaces. Returns `None` when
    /// nothing survives the policy.
    #[must_use]
    pub fn normalize_term(&self, term: &str) -> Option<String> {
        let words = self.unigrams(term);
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }
}
