//! Integration tests module
//!
//! End-to-end tests for the alcalor analyses, including:
//! - Pure analyses over hand-built documents
//! - Archive -> analysis -> table/report flows on SQLite
//! - Error propagation and per-document recovery

pub mod error_scenarios;
pub mod fixtures;
pub mod scenarios_test;
pub mod service_test;
