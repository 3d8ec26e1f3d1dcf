use super::model::{Evaluation, FeatureOutcome};
use std::collections::BTreeSet;

/// Feature names seen during one or more evaluations, split by outcome.
///
/// Owned by the caller: pass `Some(&mut diagnostics)` to the evaluations you
/// want to observe, then read, `merge` or `clear` it. Nothing accumulates
/// behind the caller's back, so separate runs (or threads) stay isolated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Features whose contract value matched a known modality
    pub matched: BTreeSet<String>,
    /// Features present in the contract with an unknown modality
    pub unmatched: BTreeSet<String>,
    /// Features the contract did not carry at all
    pub not_found: BTreeSet<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, evaluation: &Evaluation) {
        for feature in &evaluation.features {
            let set = match feature.outcome {
                FeatureOutcome::Matched { .. } => &mut self.matched,
                FeatureOutcome::Unmatched { .. } => &mut self.unmatched,
                FeatureOutcome::NotFound => &mut self.not_found,
            };
            set.insert(feature.feature.clone());
        }
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.matched.extend(other.matched);
        self.unmatched.extend(other.unmatched);
        self.not_found.extend(other.not_found);
    }

    pub fn clear(&mut self) {
        self.matched.clear();
        self.unmatched.clear();
        self.not_found.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.unmatched.is_empty() && self.not_found.is_empty()
    }

    /// Features that never matched in any recorded evaluation.
    pub fn never_matched(&self) -> BTreeSet<&str> {
        self.unmatched
            .iter()
            .chain(&self.not_found)
            .filter(|name| !self.matched.contains(*name))
            .map(String::as_str)
            .collect()
    }
}
