//! Typed queries over the `articles` table
//!
//! [`ArticleRepository`] renders SQL for the session's [`Dialect`], binds
//! parameters positionally and converts rows into model types. Every query is
//! timed and counted in the query metrics.
//!
//! # Usage
//!
//! ```rust,ignore
//! let archive = SqliteArchive::open("archive.db")?;
//! let repo = ArticleRepository::new(&archive);
//!
//! let docs = repo
//!     .documents(&DocumentFilter::new().years(2018, 2020).min_body_length(100))
//!     .await?;
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use super::{ArchiveSession, Dialect, Param, QueryError, ResultSet};
use crate::analytics::coverage::{CoveragePoint, Topic};
use crate::analytics::{validate_year_range, AnalysisResult};
use crate::metrics;
use crate::models::{ArchiveStats, Document, YearVolume};

/// Positional parameter list rendered for one dialect
struct Bindings {
    dialect: Dialect,
    params: Vec<Param>,
}

impl Bindings {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    /// Add a parameter and return its placeholder
    fn bind(&mut self, param: impl Into<Param>) -> String {
        let param = param.into();
        let placeholder = self.dialect.placeholder(self.params.len() + 1, &param);
        self.params.push(param);
        placeholder
    }

    /// Case-insensitive substring match of `column` against a literal term
    fn contains(&mut self, column: &str, term: &str) -> String {
        let placeholder = self.bind(format!("%{}%", escape_like(term)));
        format!("{column} {} {placeholder} ESCAPE '\\'", self.dialect.ilike())
    }
}

/// Escape LIKE wildcards so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Selection of articles to load as documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// Case-insensitive substring the body must contain
    pub contains: Option<String>,
    /// Bodies must be strictly longer than this
    pub min_body_length: Option<usize>,
    pub limit: Option<usize>,
    /// Prepend the title to the document text
    pub with_title: bool,
}

impl DocumentFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn year(self, year: i32) -> Self {
        self.years(year, year)
    }

    #[must_use]
    pub fn years(mut self, start: i32, end: i32) -> Self {
        self.start_year = Some(start);
        self.end_year = Some(end);
        self
    }

    #[must_use]
    pub fn containing(mut self, term: impl Into<String>) -> Self {
        self.contains = Some(term.into());
        self
    }

    #[must_use]
    pub fn min_body_length(mut self, length: usize) -> Self {
        self.min_body_length = Some(length);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_title(mut self) -> Self {
        self.with_title = true;
        self
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            validate_year_range(start, end)?;
        }
        Ok(())
    }

    /// Render the document query for a dialect
    fn to_sql(&self, dialect: Dialect) -> (String, Vec<Param>) {
        let mut bindings = Bindings::new(dialect);
        let mut conditions = vec!["publication_date IS NOT NULL".to_string()];

        let year = dialect.year_of("publication_date");
        if let Some(start) = self.start_year {
            conditions.push(format!("{year} >= {}", bindings.bind(start)));
        }
        if let Some(end) = self.end_year {
            conditions.push(format!("{year} <= {}", bindings.bind(end)));
        }
        if let Some(term) = &self.contains {
            conditions.push(bindings.contains("body", term));
        }
        if let Some(length) = self.min_body_length {
            let length = i64::try_from(length).unwrap_or(i64::MAX);
            conditions.push(format!("LENGTH(body) > {}", bindings.bind(length)));
        }

        let text = if self.with_title {
            "COALESCE(title, '') || ' ' || COALESCE(body, '')"
        } else {
            "body"
        };

        let mut sql = format!(
            "SELECT id, {} AS publication_date, {text} AS body FROM articles WHERE {} \
             ORDER BY publication_date, id",
            dialect.as_timestamp("publication_date"),
            conditions.join(" AND ")
        );
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, bindings.params)
    }
}

/// Read-only access to the article archive through a session
pub struct ArticleRepository<'a> {
    session: &'a dyn ArchiveSession,
}

impl<'a> ArticleRepository<'a> {
    #[must_use]
    pub fn new(session: &'a dyn ArchiveSession) -> Self {
        Self { session }
    }

    fn dialect(&self) -> Dialect {
        self.session.dialect()
    }

    async fn run(&self, sql: &str, params: &[Param]) -> Result<ResultSet, QueryError> {
        let backend = self.session.backend();
        let started = Instant::now();
        let result = self.session.query(sql, params).await;
        let elapsed = started.elapsed().as_secs_f64();

        metrics::record_query(backend, result.is_ok(), elapsed);
        match &result {
            Ok(rows) => tracing::debug!(backend, rows = rows.len(), elapsed, "Query executed"),
            Err(e) => tracing::error!(backend, error = %e, "Query failed"),
        }
        result
    }

    /// Load documents matching a filter, ordered by publication date
    pub async fn documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>, QueryError> {
        let (sql, params) = filter.to_sql(self.dialect());
        let rows = self.run(&sql, &params).await?;
        rows.rows().iter().map(Document::try_from).collect()
    }

    /// Archive-wide statistics
    pub async fn stats(&self) -> Result<ArchiveStats, QueryError> {
        let d = self.dialect();
        let sql = format!(
            "SELECT {} AS total_articles, {} AS earliest_date, {} AS latest_date, \
             {} AS unique_sections, {} AS avg_body_length FROM articles",
            d.as_bigint("COUNT(*)"),
            d.as_timestamp("MIN(publication_date)"),
            d.as_timestamp("MAX(publication_date)"),
            d.as_bigint("COUNT(DISTINCT section)"),
            d.as_float("AVG(LENGTH(body))"),
        );

        let rows = self.run(&sql, &[]).await?;
        match rows.first() {
            Some(row) => ArchiveStats::try_from(row),
            None => Ok(ArchiveStats::default()),
        }
    }

    /// Article count and mean body length per publication year
    pub async fn volume_by_year(&self) -> Result<Vec<YearVolume>, QueryError> {
        let d = self.dialect();
        let sql = format!(
            "SELECT {} AS year, {} AS articles, {} AS avg_length FROM articles \
             WHERE publication_date IS NOT NULL GROUP BY 1 ORDER BY 1",
            d.year_of("publication_date"),
            d.as_bigint("COUNT(*)"),
            d.as_float("AVG(LENGTH(body))"),
        );

        let rows = self.run(&sql, &[]).await?;
        rows.rows().iter().map(YearVolume::try_from).collect()
    }

    /// Monthly article totals and per-topic keyword hits
    pub async fn monthly_coverage(&self, topics: &[Topic]) -> Result<Vec<CoveragePoint>, QueryError> {
        let d = self.dialect();
        let mut bindings = Bindings::new(d);

        let columns: Vec<String> = topics
            .iter()
            .enumerate()
            .map(|(i, topic)| {
                if topic.keywords.is_empty() {
                    return format!("0 AS t{i}");
                }
                let matches: Vec<String> = topic
                    .keywords
                    .iter()
                    .map(|k| bindings.contains("body", k))
                    .collect();
                format!(
                    "{} AS t{i}",
                    d.as_bigint(&format!(
                        "SUM(CASE WHEN {} THEN 1 ELSE 0 END)",
                        matches.join(" OR ")
                    ))
                )
            })
            .collect();

        let mut select = vec![
            format!("{} AS month", d.month_of("publication_date")),
            format!("{} AS total", d.as_bigint("COUNT(*)")),
        ];
        select.extend(columns);

        let sql = format!(
            "SELECT {} FROM articles WHERE publication_date IS NOT NULL GROUP BY 1 ORDER BY 1",
            select.join(", ")
        );

        let rows = self.run(&sql, &bindings.params).await?;
        rows.rows()
            .iter()
            .map(|row| {
                let counts: BTreeMap<String, u64> = topics
                    .iter()
                    .enumerate()
                    .map(|(i, topic)| Ok((topic.name.clone(), row.get::<u64>(&format!("t{i}"))?)))
                    .collect::<Result<_, QueryError>>()?;
                Ok(CoveragePoint {
                    month: row.get("month")?,
                    total: row.get("total")?,
                    counts,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteArchive;

    fn seeded() -> SqliteArchive {
        let archive = SqliteArchive::in_memory().unwrap();
        let rows = [
            (1, Some("estado"), "2019-01-10 08:00:00", "Violencia en Xalapa"),
            (2, Some("estado"), "2019-01-20 09:00:00", "Lluvias intensas"),
            (3, Some("política"), "2020-02-03 10:00:00", "Fraude electoral y violencia"),
            (4, None, "2020-02-04", "Inauguración de hospital"),
        ];
        for (id, section, date, body) in rows {
            archive
                .insert_article(id, "Título", section, date, body)
                .unwrap();
        }
        archive
    }

    #[test]
    fn test_filter_sql_sqlite() {
        let filter = DocumentFilter::new()
            .years(2018, 2020)
            .containing("crimen")
            .min_body_length(100)
            .limit(50);
        let (sql, params) = filter.to_sql(Dialect::Sqlite);

        assert!(sql.contains("CAST(strftime('%Y', publication_date) AS INTEGER) >= ?1"));
        assert!(sql.contains("body LIKE ?3"));
        assert!(sql.contains("LENGTH(body) > ?4"));
        assert!(sql.ends_with("LIMIT 50"));
        assert_eq!(
            params,
            vec![
                Param::Int(2018),
                Param::Int(2020),
                Param::Text("%crimen%".into()),
                Param::Int(100)
            ]
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("crimen"), "crimen");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }

    #[tokio::test]
    async fn test_containing_matches_wildcards_literally() {
        let archive = SqliteArchive::in_memory().unwrap();
        let rows = [
            (1, "Aumento del 50% en tarifas"),
            (2, "Aumento del 500 en tarifas"),
            (3, "Clave obra_norte"),
            (4, "Clave obra-norte"),
        ];
        for (id, body) in rows {
            archive
                .insert_article(id, "", None, "2021-03-01", body)
                .unwrap();
        }
        let repo = ArticleRepository::new(&archive);

        let docs = repo
            .documents(&DocumentFilter::new().containing("50%"))
            .await
            .unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1]);

        let docs = repo
            .documents(&DocumentFilter::new().containing("obra_norte"))
            .await
            .unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_filter_sql_postgres() {
        let (sql, _) = DocumentFilter::new()
            .year(2020)
            .containing("crimen")
            .to_sql(Dialect::Postgres);
        assert!(sql.contains("EXTRACT(YEAR FROM publication_date)::int >= $1::bigint"));
        assert!(sql.contains("body ILIKE $3::text"));
        assert!(sql.contains("(publication_date)::timestamp AS publication_date"));
    }

    #[test]
    fn test_filter_validation() {
        assert!(DocumentFilter::new().years(2021, 2019).validate().is_err());
        assert!(DocumentFilter::new().year(2021).validate().is_ok());
    }

    #[tokio::test]
    async fn test_documents_by_year_and_term() {
        let archive = seeded();
        let repo = ArticleRepository::new(&archive);

        let docs = repo.documents(&DocumentFilter::new().year(2020)).await.unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 4]);

        let docs = repo
            .documents(&DocumentFilter::new().containing("VIOLENCIA"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_documents_with_title() {
        let archive = seeded();
        let repo = ArticleRepository::new(&archive);
        let docs = repo
            .documents(&DocumentFilter::new().year(2019).with_title().limit(1))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text().unwrap(), "Título Violencia en Xalapa");
    }

    #[tokio::test]
    async fn test_stats_and_volume() {
        let archive = seeded();
        let repo = ArticleRepository::new(&archive);

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total_articles, 4);
        assert_eq!(stats.unique_sections, 2);
        assert_eq!(stats.first_year(), Some(2019));
        assert_eq!(stats.last_year(), Some(2020));

        let volume = repo.volume_by_year().await.unwrap();
        assert_eq!(volume.len(), 2);
        assert_eq!(volume[0].year, 2019);
        assert_eq!(volume[0].articles, 2);
    }

    #[tokio::test]
    async fn test_stats_on_empty_archive() {
        let archive = SqliteArchive::in_memory().unwrap();
        let stats = ArticleRepository::new(&archive).stats().await.unwrap();
        assert_eq!(stats.total_articles, 0);
        assert!(stats.earliest.is_none());
    }

    #[tokio::test]
    async fn test_monthly_coverage() {
        let archive = seeded();
        let repo = ArticleRepository::new(&archive);
        let topics = vec![
            Topic::new("violencia", &["violencia"]),
            Topic::new("salud", &["hospital"]),
            Topic::new("vacio", &[]),
        ];

        let points = repo.monthly_coverage(&topics).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month, "2019-01");
        assert_eq!(points[0].total, 2);
        assert_eq!(points[0].counts["violencia"], 1);
        assert_eq!(points[1].counts["salud"], 1);
        assert_eq!(points[1].counts["vacio"], 0);
    }
}
