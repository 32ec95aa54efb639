// Core data structures for the alcalor archive

use std::borrow::Cow;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::analytics::TokenizationError;
use crate::storage::{QueryError, Row};
use crate::utils::decode_utf8;

/// Archived news article as seen by the analysis core
///
/// The body is kept as raw bytes: the archive occasionally holds content in a
/// foreign encoding, which surfaces as a per-document [`TokenizationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: i64,
    pub publication_date: NaiveDateTime,
    raw_text: Vec<u8>,
}

impl Document {
    /// Create a document from UTF-8 text
    pub fn new(id: i64, publication_date: NaiveDateTime, text: impl Into<String>) -> Self {
        Self {
            id,
            publication_date,
            raw_text: text.into().into_bytes(),
        }
    }

    /// Create a document from raw bytes of unknown validity
    pub fn from_bytes(id: i64, publication_date: NaiveDateTime, bytes: Vec<u8>) -> Self {
        Self {
            id,
            publication_date,
            raw_text: bytes,
        }
    }

    /// Calendar year of publication, the time bucket used by every analysis
    pub fn year(&self) -> i32 {
        self.publication_date.year()
    }

    pub fn raw_text(&self) -> &[u8] {
        &self.raw_text
    }

    /// Decode the body as UTF-8
    pub fn text(&self) -> Result<Cow<'_, str>, TokenizationError> {
        decode_utf8(&self.raw_text).ok_or(TokenizationError::InvalidEncoding {
            document_id: self.id,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.iter().all(u8::is_ascii_whitespace)
    }
}

impl TryFrom<&Row> for Document {
    type Error = QueryError;

    /// Expects columns `id`, `publication_date` and `body`; a NULL body is an
    /// empty document
    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let id: i64 = row.get("id")?;
        let publication_date: NaiveDateTime = row.get("publication_date")?;
        let body: Option<Vec<u8>> = row.get("body")?;
        Ok(Self::from_bytes(id, publication_date, body.unwrap_or_default()))
    }
}

/// Archive-wide statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArchiveStats {
    pub total_articles: u64,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
    pub unique_sections: u64,
    pub avg_body_length: f64,
}

impl ArchiveStats {
    /// First calendar year present in the archive
    pub fn first_year(&self) -> Option<i32> {
        self.earliest.map(|ts| ts.year())
    }

    /// Last calendar year present in the archive
    pub fn last_year(&self) -> Option<i32> {
        self.latest.map(|ts| ts.year())
    }
}

impl TryFrom<&Row> for ArchiveStats {
    type Error = QueryError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            total_articles: row.get("total_articles")?,
            earliest: row.get("earliest_date")?,
            latest: row.get("latest_date")?,
            unique_sections: row.get("unique_sections")?,
            avg_body_length: row.get::<Option<f64>>("avg_body_length")?.unwrap_or(0.0),
        })
    }
}

/// Article volume for one publication year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearVolume {
    pub year: i32,
    pub articles: u64,
    pub avg_length: f64,
}

impl TryFrom<&Row> for YearVolume {
    type Error = QueryError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            year: row.get("year")?,
            articles: row.get("articles")?,
            avg_length: row.get::<Option<f64>>("avg_length")?.unwrap_or(0.0),
        })
    }
}
