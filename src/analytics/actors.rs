//! Key actors: frequently named people and organizations
//!
//! Uses capitalized two-word sequences as a lightweight stand-in for named
//! entity recognition.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{AnalysisResult, InvalidParameterError};
use crate::models::Document;

lazy_static! {
    static ref NAME_RE: Regex =
        Regex::new(r"\b([A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)\s+([A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)\b")
            .expect("valid regex");
}

/// Capitalized pairs that are places or mastheads rather than actors
const FALSE_POSITIVES: &[&str] = &[
    "Boca Del",
    "Del Río",
    "De La",
    "La Cruz",
    "El Puerto",
    "Las Vegas",
    "Los Angeles",
    "San Juan",
    "Nueva York",
    "Estados Unidos",
    "Al Calor",
    "Calor Político",
    "Monte Alto",
    "Paso Del",
    "Zona Norte",
    "Zona Centro",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorMention {
    pub name: String,
    pub mentions: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorMentions {
    /// Ordered by mentions desc, then name
    pub actors: Vec<ActorMention>,
    pub document_count: usize,
    pub skipped_documents: usize,
}

#[derive(Debug, Clone)]
pub struct ActorExtractor {
    false_positives: HashSet<String>,
    min_word_length: usize,
}

impl Default for ActorExtractor {
    fn default() -> Self {
        Self {
            false_positives: FALSE_POSITIVES.iter().map(|s| (*s).to_string()).collect(),
            min_word_length: 3,
        }
    }
}

impl ActorExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore an additional name
    #[must_use]
    pub fn with_false_positive(mut self, name: impl Into<String>) -> Self {
        self.false_positives.insert(name.into());
        self
    }

    fn names<'t>(&'t self, text: &'t str) -> impl Iterator<Item = String> + 't {
        NAME_RE.captures_iter(text).filter_map(move |caps| {
            let first = caps.get(1)?.as_str();
            let last = caps.get(2)?.as_str();
            if first.chars().count() < self.min_word_length
                || last.chars().count() < self.min_word_length
            {
                return None;
            }
            let name = format!("{first} {last}");
            (!self.false_positives.contains(&name)).then_some(name)
        })
    }

    /// Count name mentions over documents, keeping the `top_n` most mentioned
    pub fn extract(&self, docs: &[Document], top_n: usize) -> AnalysisResult<ActorMentions> {
        if top_n == 0 {
            return Err(InvalidParameterError::ZeroTopN);
        }

        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut document_count = 0;
        let mut skipped_documents = 0;

        for doc in docs {
            match doc.text() {
                Ok(text) => {
                    document_count += 1;
                    for name in self.names(&text) {
                        *counts.entry(name).or_insert(0) += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(document_id = doc.id, error = %e, "Skipping document");
                    skipped_documents += 1;
                }
            }
        }

        let mut actors: Vec<ActorMention> = counts
            .into_iter()
            .map(|(name, mentions)| ActorMention { name, mentions })
            .collect();
        actors.sort_by(|a, b| b.mentions.cmp(&a.mentions).then_with(|| a.name.cmp(&b.name)));
        actors.truncate(top_n);

        Ok(ActorMentions {
            actors,
            document_count,
            skipped_documents,
        })
    }
}
