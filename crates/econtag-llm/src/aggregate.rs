//! Order-insensitive merge of chunk candidates into one valid label set.

use std::collections::BTreeSet;

use econtag_common::labels::{AllowedVocabulary, Category, FallbackLabels, LabelSet};

/// Merges raw chunk candidates, enforcing the allowed-vocabulary and
/// non-empty invariants.
pub struct Aggregator {
    vocabulary: AllowedVocabulary,
    fallback: FallbackLabels,
}

impl Aggregator {
    pub fn new(vocabulary: AllowedVocabulary, fallback: FallbackLabels) -> Self {
        Self { vocabulary, fallback }
    }

    /// Reduce zero or more raw candidates to one valid LabelSet.
    ///
    /// Per category: union across candidates, filtered to the allowed
    /// vocabulary, then the fallback label if the union came out empty.
    /// The reduction is a pure set union, so candidate order never affects
    /// the result, and `BTreeSet` keeps the output sorted and deduplicated.
    pub fn merge(&self, candidates: &[LabelSet]) -> LabelSet {
        let mut merged = LabelSet::default();

        for category in Category::ALL {
            let allowed = self.vocabulary.for_category(category);
            let union: BTreeSet<String> = candidates
                .iter()
                .flat_map(|candidate| candidate.category(category))
                .filter(|label| allowed.contains(*label))
                .cloned()
                .collect();
            *merged.category_mut(category) = union;
        }

        for category in Category::ALL {
            let labels = merged.category_mut(category);
            if labels.is_empty() {
                labels.insert(self.fallback.for_category(category).to_string());
            }
        }

        merged
    }
}
