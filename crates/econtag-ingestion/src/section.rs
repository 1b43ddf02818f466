//! Relevance-weighted excerpt extraction.
//!
//! Papers are long and mostly noise for classification purposes; the
//! abstract, the opening of the introduction, and the conclusion carry the
//! signal. The extractor keeps only those windows and caps the total size
//! so downstream prompts stay bounded.

use tracing::debug;

/// Windowing policy for the excerpt.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Hard cap on total excerpt lines.
    pub max_lines: usize,
    /// Lines kept from the introduction marker onward.
    pub intro_lines: usize,
    /// Lines kept from the conclusion marker onward.
    pub conclusion_lines: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_lines:        3000,
            intro_lines:      200,
            conclusion_lines: 150,
        }
    }
}

/// Build the excerpt from per-page text.
///
/// Pages are joined with newlines and scanned line by line for the first
/// occurrence (case-insensitive substring) of "abstract", "introduction",
/// and "conclusion". The excerpt is, in order:
///   (a) abstract marker up to the introduction marker, only if both
///       markers were found and the abstract precedes the introduction;
///   (b) up to `intro_lines` lines from the introduction marker;
///   (c) up to `conclusion_lines` lines from the conclusion marker;
/// truncated to `max_lines`. No markers found yields an empty excerpt,
/// an accepted degenerate case rather than an error.
pub fn extract_excerpt(pages: &[String], config: &ExtractorConfig) -> String {
    let text = pages.join("\n");
    let lines: Vec<&str> = text.lines().collect();

    let find_marker = |needle: &str| {
        lines
            .iter()
            .position(|line| line.to_lowercase().contains(needle))
    };

    let abstract_at   = find_marker("abstract");
    let intro_at      = find_marker("introduction");
    let conclusion_at = find_marker("conclusion");

    let mut picked: Vec<&str> = Vec::new();

    if let (Some(a), Some(i)) = (abstract_at, intro_at) {
        if a < i {
            picked.extend_from_slice(&lines[a..i]);
        }
    }

    if let Some(i) = intro_at {
        let end = (i + config.intro_lines).min(lines.len());
        picked.extend_from_slice(&lines[i..end]);
    }

    if let Some(c) = conclusion_at {
        let end = (c + config.conclusion_lines).min(lines.len());
        picked.extend_from_slice(&lines[c..end]);
    }

    picked.truncate(config.max_lines);

    debug!(
        ?abstract_at,
        ?intro_at,
        ?conclusion_at,
        excerpt_lines = picked.len(),
        "excerpt built"
    );

    picked.join("\n")
}
