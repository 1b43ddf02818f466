//! econtag-ingestion — PDF acquisition and excerpt preparation.
//!
//! Turns a paper's PDF source into the ordered chunk sequence the
//! classification client consumes: fetch → page text → section excerpt →
//! fixed-width chunks, plus the keyword hint scanner.

pub mod chunker;
pub mod fetch;
pub mod keywords;
pub mod pdf_text;
pub mod section;
