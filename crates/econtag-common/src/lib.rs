//! econtag-common — shared error type, label vocabulary, and paper model.

pub mod error;
pub mod labels;
pub mod paper;
