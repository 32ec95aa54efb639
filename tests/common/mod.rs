//! Common test utilities

use alcalor::models::Document;
use alcalor::storage::SqliteArchive;
use chrono::{NaiveDate, NaiveDateTime};

/// Midnight on March 1st of `year`
pub fn date_in(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Create a document published in `year`
pub fn doc(id: i64, year: i32, text: &str) -> Document {
    Document::new(id, date_in(year), text)
}

/// Create a document whose body is not valid UTF-8
#[allow(dead_code)]
pub fn undecodable_doc(id: i64, year: i32) -> Document {
    Document::from_bytes(id, date_in(year), vec![0x65, 0x63, 0xff, 0xfe])
}

/// In-memory archive holding `(id, date, body)` rows
#[allow(dead_code)]
pub fn archive_with(rows: &[(i64, &str, &str)]) -> SqliteArchive {
    let archive = SqliteArchive::in_memory().unwrap();
    for (id, date, body) in rows {
        archive.insert_article(*id, "", None, date, body).unwrap();
    }
    archive
}
