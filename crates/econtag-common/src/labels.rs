//! Classification categories, label sets, and the closed label vocabulary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The three classification axes every paper is labelled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Methodology,
    Field,
    EmpiricalApproach,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Methodology,
        Category::Field,
        Category::EmpiricalApproach,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Methodology       => "methodology",
            Category::Field             => "field",
            Category::EmpiricalApproach => "empirical_approach",
        }
    }
}

/// Labels per category. `BTreeSet` keeps each category deduplicated and
/// lexicographically sorted, so serialized output is deterministic.
///
/// Raw chunk candidates deserialize into this type too; a missing key is an
/// empty set, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    #[serde(default)]
    pub methodology: BTreeSet<String>,
    #[serde(default)]
    pub field: BTreeSet<String>,
    #[serde(default)]
    pub empirical_approach: BTreeSet<String>,
}

impl LabelSet {
    pub fn category(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Methodology       => &self.methodology,
            Category::Field             => &self.field,
            Category::EmpiricalApproach => &self.empirical_approach,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Methodology       => &mut self.methodology,
            Category::Field             => &mut self.field,
            Category::EmpiricalApproach => &mut self.empirical_approach,
        }
    }

    /// True when every category is empty.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.category(*c).is_empty())
    }
}

/// The closed set of valid labels per category. Fixed at startup; passed
/// explicitly into the components that filter against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedVocabulary {
    pub methodology: BTreeSet<String>,
    pub field: BTreeSet<String>,
    pub empirical_approach: BTreeSet<String>,
}

impl AllowedVocabulary {
    pub fn for_category(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Methodology       => &self.methodology,
            Category::Field             => &self.field,
            Category::EmpiricalApproach => &self.empirical_approach,
        }
    }

    pub fn contains(&self, category: Category, label: &str) -> bool {
        self.for_category(category).contains(label)
    }
}

impl Default for AllowedVocabulary {
    /// The economics classification vocabulary.
    fn default() -> Self {
        let set = |labels: &[&str]| labels.iter().map(|s| s.to_string()).collect();
        Self {
            methodology: set(&["Econometrics", "Empirical", "Macro", "Theory"]),
            field: set(&[
                "Behavioral", "Development", "Econometrics", "Experimental",
                "Finance", "Industrial Organization", "Labor",
                "Macro", "Public", "Theory", "Trade",
            ]),
            empirical_approach: set(&[
                "Descriptive/Observational", "Event Study", "Lab Experiment",
                "RCT", "Regression Discontinuity", "Structural Model Estimation",
                "Synthetic Control", "Other",
            ]),
        }
    }
}

/// The label substituted for a category that is still empty after
/// aggregation. One per category, never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackLabels {
    pub methodology: String,
    pub field: String,
    pub empirical_approach: String,
}

impl FallbackLabels {
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Methodology       => &self.methodology,
            Category::Field             => &self.field,
            Category::EmpiricalApproach => &self.empirical_approach,
        }
    }
}

impl Default for FallbackLabels {
    fn default() -> Self {
        Self {
            methodology:        "Empirical".to_string(),
            field:              "Public".to_string(),
            empirical_approach: "Descriptive/Observational".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_contains_defaults() {
        let vocab = AllowedVocabulary::default();
        assert!(vocab.contains(Category::Methodology, "Empirical"));
        assert!(vocab.contains(Category::Field, "Industrial Organization"));
        assert!(vocab.contains(Category::EmpiricalApproach, "Regression Discontinuity"));
        assert!(!vocab.contains(Category::Field, "Astrology"));
    }

    #[test]
    fn test_fallbacks_are_vocabulary_valid() {
        let vocab = AllowedVocabulary::default();
        let fallback = FallbackLabels::default();
        for category in Category::ALL {
            assert!(
                vocab.contains(category, fallback.for_category(category)),
                "fallback for {} must be in the vocabulary",
                category.as_str()
            );
        }
    }

    #[test]
    fn test_label_set_missing_keys_deserialize_empty() {
        let raw: LabelSet = serde_json::from_str(r#"{"methodology": ["Theory"]}"#).unwrap();
        assert_eq!(raw.methodology.len(), 1);
        assert!(raw.field.is_empty());
        assert!(raw.empirical_approach.is_empty());
    }

    #[test]
    fn test_label_set_deduplicates_on_deserialize() {
        let raw: LabelSet =
            serde_json::from_str(r#"{"field": ["Labor", "Labor", "Trade"]}"#).unwrap();
        assert_eq!(raw.field.len(), 2);
    }

    #[test]
    fn test_label_set_serializes_sorted() {
        let mut labels = LabelSet::default();
        labels.methodology.insert("Theory".to_string());
        labels.methodology.insert("Empirical".to_string());
        let json = serde_json::to_string(&labels).unwrap();
        assert!(json.find("Empirical").unwrap() < json.find("Theory").unwrap());
    }
}
