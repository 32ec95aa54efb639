//! HTML report rendering with the Handlebars template engine

use chrono::Utc;
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::Table;
use crate::error::Result;

/// Default report template
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report.hbs");

/// A titled collection of tables
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<Table>,
}

impl Report {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, table: impl Into<Table>) {
        self.sections.push(table.into());
    }
}

/// Template data for rendering
#[derive(Debug, Serialize)]
struct ReportTemplateData<'r> {
    title: &'r str,
    generated_at: String,
    sections: Vec<SectionData<'r>>,
}

#[derive(Debug, Serialize)]
struct SectionData<'r> {
    title: &'r str,
    columns: &'r [String],
    rows: Vec<Vec<String>>,
    empty: bool,
}

impl<'r> From<&'r Report> for ReportTemplateData<'r> {
    fn from(report: &'r Report) -> Self {
        Self {
            title: &report.title,
            generated_at: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
            sections: report
                .sections
                .iter()
                .map(|table| SectionData {
                    title: &table.title,
                    columns: &table.columns,
                    rows: table.formatted_rows(),
                    empty: table.is_empty(),
                })
                .collect(),
        }
    }
}

/// Writes reports as HTML files
pub struct ReportWriter<'a> {
    handlebars: Handlebars<'a>,
    output_dir: PathBuf,
}

impl<'a> ReportWriter<'a> {
    /// Create a writer with the default template
    pub fn new(output_dir: &Path) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_template_string("report", DEFAULT_TEMPLATE)?;

        Ok(Self {
            handlebars,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Create with a custom template file
    pub fn with_template(output_dir: &Path, template_path: &Path) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_file("report", template_path)?;

        Ok(Self {
            handlebars,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Render a report to an HTML string
    pub fn render(&self, report: &Report) -> Result<String> {
        let data = ReportTemplateData::from(report);
        Ok(self.handlebars.render("report", &data)?)
    }

    /// Render and write a report; relative names land in the output directory
    pub fn save(&self, report: &Report, file_name: &Path) -> Result<PathBuf> {
        let html = self.render(report)?;
        let path = if file_name.is_absolute() {
            file_name.to_path_buf()
        } else {
            self.output_dir.join(file_name)
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;

        tracing::info!(path = %path.display(), sections = report.sections.len(), "Report written");
        Ok(path)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
