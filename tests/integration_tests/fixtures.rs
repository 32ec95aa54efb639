//! Test fixtures for integration tests
//!
//! Provides a small archive of Spanish news bodies and helpers to load it.

use alcalor::models::Document;
use alcalor::storage::SqliteArchive;
use chrono::NaiveDate;

/// `(id, title, section, publication_date, body)` rows of the sample archive
pub const SAMPLE_ARTICLES: &[(i64, &str, Option<&str>, &str, &str)] = &[
    (
        1,
        "Lluvias en el sur",
        Some("estado"),
        "2017-09-12 08:15:00",
        "Las lluvias afectan caminos del sur del estado. Protección Civil mantiene la alerta.",
    ),
    (
        2,
        "Obra pública",
        Some("estado"),
        "2018-02-03 10:00:00",
        "El gobierno inaugura una carretera y anuncia más obras para el puerto.",
    ),
    (
        3,
        "Seguridad",
        Some("policiaca"),
        "2018-11-20 22:40:00",
        "Reportan un homicidio y un asalto en la zona conurbada; crece la violencia.",
    ),
    (
        4,
        "Plan de seguridad",
        Some("política"),
        "2019-06-01 09:00:00",
        "Cuitláhuac García presenta su plan de seguridad. La violencia preocupa a los ciudadanos.",
    ),
    (
        5,
        "Pandemia",
        Some("salud"),
        "2020-03-18 12:00:00",
        "Confirman casos de pandemia en el estado. El hospital regional recibe pacientes.",
    ),
    (
        6,
        "Vacunas",
        Some("salud"),
        "2020-12-24 07:30:00",
        "Llegan vacunas contra la pandemia. Cuitláhuac García anuncia la campaña de vacunación.",
    ),
];

/// Load the sample archive into memory
pub fn sample_archive() -> SqliteArchive {
    let archive = SqliteArchive::in_memory().unwrap();
    for (id, title, section, date, body) in SAMPLE_ARTICLES {
        archive
            .insert_article(*id, title, *section, date, body)
            .unwrap();
    }
    archive
}

/// Document dated January 1st of `year`
pub fn doc(id: i64, year: i32, text: &str) -> Document {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Document::new(id, date, text)
}
