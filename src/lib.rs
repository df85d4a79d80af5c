//! Scenario publisher core library.
//!
//! Turns a test-management export (scenarios, action words and optionally
//! flattened tests) into test code for a target language, and reports how
//! action word signatures changed since the previous export.
//!
//! The pipeline is [`document`] → [`model`] → [`render`] for code
//! generation and [`signature`] → [`report`] for change reports. Template
//! catalogues in [`templates`] hold all language-specific text.

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod document;
pub mod identifier;
pub mod model;
pub mod render;
pub mod report;
pub mod runner;
pub mod signature;
pub mod templates;
