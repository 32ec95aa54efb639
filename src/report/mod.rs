//! Report layer: tables for every analysis result and an HTML report
//!
//! - [`table`] - [`Table`] conversions and plain-text rendering
//! - [`html`] - [`ReportWriter`] rendering a [`Report`] through Handlebars

pub mod html;
pub mod table;

pub use html::{Report, ReportWriter};
pub use table::Table;
