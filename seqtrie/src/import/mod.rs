//! Parsers turning dictionary sources into validated rules

pub mod rules;
pub use rules::{parse_lines, parse_rules, IngestError, Rule};
