//! Keyword-based empirical-approach hints.
//!
//! Phrases like "regression discontinuity" or "donor pool" in the excerpt
//! indicate a specific empirical approach. Matches become one extra raw
//! candidate for the aggregator; the merge is an order-insensitive union,
//! so the extra candidate composes with the model's answers.

use regex::RegexBuilder;
use tracing::debug;

use econtag_common::labels::LabelSet;

/// Scans excerpts for approach-indicative phrases.
pub struct ApproachKeywords {
    patterns: Vec<(String, Vec<regex::Regex>)>,
}

impl Default for ApproachKeywords {
    fn default() -> Self {
        Self::from_table(&[
            ("Regression Discontinuity", &["regression discontinuity", "cutoff", "threshold", "border"]),
            ("Event Study",              &["event study", "policy shock", "announcement"]),
            ("RCT",                      &["randomized", "random assignment", "field experiment"]),
            ("Synthetic Control",        &["synthetic control", "donor pool"]),
            ("Structural Model Estimation", &["structural model", "calibration"]),
            ("Lab Experiment",           &["lab experiment", "laboratory"]),
            ("Descriptive/Observational", &["panel data", "survey", "observational"]),
            ("Other",                    &["IV", "instrument", "cointegration", "autoregressive", "VAR"]),
        ])
    }
}

impl ApproachKeywords {
    fn from_table(table: &[(&str, &[&str])]) -> Self {
        let patterns = table
            .iter()
            .map(|(label, keywords)| {
                let regexes = keywords
                    .iter()
                    .map(|kw| {
                        // Word-bounded so short keywords like "IV" do not
                        // match inside unrelated words.
                        RegexBuilder::new(&format!(r"\b{}\b", regex::escape(kw)))
                            .case_insensitive(true)
                            .build()
                            .expect("static keyword pattern")
                    })
                    .collect();
                (label.to_string(), regexes)
            })
            .collect();
        Self { patterns }
    }

    /// Produce a raw candidate whose `empirical_approach` set holds every
    /// approach with at least one keyword hit. The other categories stay
    /// empty; vocabulary filtering remains the aggregator's job.
    pub fn scan(&self, excerpt: &str) -> LabelSet {
        let mut hints = LabelSet::default();
        for (label, regexes) in &self.patterns {
            if regexes.iter().any(|re| re.is_match(excerpt)) {
                hints.empirical_approach.insert(label.clone());
            }
        }
        if !hints.empirical_approach.is_empty() {
            debug!(approaches = ?hints.empirical_approach, "keyword hints matched");
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_match_sets_approach() {
        let scanner = ApproachKeywords::default();
        let hints = scanner.scan("We exploit a regression discontinuity at the eligibility cutoff.");
        assert!(hints.empirical_approach.contains("Regression Discontinuity"));
        assert!(hints.methodology.is_empty());
        assert!(hints.field.is_empty());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let scanner = ApproachKeywords::default();
        let hints = scanner.scan("A RANDOMIZED evaluation across 75 schools.");
        assert!(hints.empirical_approach.contains("RCT"));
    }

    #[test]
    fn test_short_keyword_needs_word_boundary() {
        let scanner = ApproachKeywords::default();
        // "university" and "given" contain "iv" but must not trigger "Other".
        let hints = scanner.scan("The university was given a grant.");
        assert!(!hints.empirical_approach.contains("Other"));

        let hints = scanner.scan("We use rainfall as an IV for income.");
        assert!(hints.empirical_approach.contains("Other"));
    }

    #[test]
    fn test_no_match_yields_empty_candidate() {
        let scanner = ApproachKeywords::default();
        assert!(scanner.scan("A purely theoretical contribution.").is_empty());
    }

    #[test]
    fn test_multiple_approaches_accumulate() {
        let scanner = ApproachKeywords::default();
        let hints = scanner
            .scan("An event study around the announcement, with a synthetic control robustness check.");
        assert!(hints.empirical_approach.contains("Event Study"));
        assert!(hints.empirical_approach.contains("Synthetic Control"));
    }
}
