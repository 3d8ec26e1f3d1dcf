use super::diagnostics::Diagnostics;
use super::error::ModelError;
use super::feature::Feature;
use crate::config::{DuplicatePolicy, SheetLayout};
use crate::contracts::Contract;
use crate::normalize::normalize_key;
use crate::workbook::{cell_ref, Sheet};
use std::collections::HashMap;
use std::fmt;

/// What a single feature did to the score.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutcome {
    /// The contract value matched a modality; the score was multiplied
    Matched { value: String, coefficient: f64 },
    /// The contract carries the field but its value is not a known modality
    Unmatched { value: String },
    /// The contract does not carry the field
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEvaluation {
    pub feature: String,
    pub outcome: FeatureOutcome,
}

/// Score of one contract under one model, with the per-feature trail.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub base: f64,
    pub score: f64,
    pub features: Vec<FeatureEvaluation>,
}

/// A scoring sheet: `base × Π coefficient(feature, contract[feature])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub base: f64,
    /// Sorted by source column
    features: Vec<Feature>,
    index: HashMap<String, usize>,
}

impl Model {
    /// Build a model from features; a later feature with the same name replaces
    /// an earlier one.
    pub fn new(name: impl Into<String>, base: f64, features: impl IntoIterator<Item = Feature>) -> Self {
        let by_name: HashMap<String, Feature> = features
            .into_iter()
            .map(|feature| (feature.name.clone(), feature))
            .collect();
        Self::with_features(name.into(), base, by_name)
    }

    fn with_features(name: String, base: f64, by_name: HashMap<String, Feature>) -> Self {
        let mut features: Vec<Feature> = by_name.into_values().collect();
        features.sort_by(|a, b| a.column.cmp(&b.column).then_with(|| a.name.cmp(&b.name)));
        let index = features
            .iter()
            .enumerate()
            .map(|(i, feature)| (feature.name.clone(), i))
            .collect();
        Self {
            name,
            base,
            features,
            index,
        }
    }

    /// Parse a model sheet.
    ///
    /// The base marker must sit at (`base_row`, `base_col`) with the base
    /// coefficient to its right. Every non-blank cell of the header row starts
    /// a feature.
    pub fn from_sheet(
        sheet: &Sheet,
        layout: &SheetLayout,
        duplicates: DuplicatePolicy,
    ) -> Result<Self, ModelError> {
        let base = read_base(sheet, layout)?;
        let mut features: HashMap<String, Feature> = HashMap::new();

        for column in 0..sheet.row_width(layout.header_row) {
            if sheet.cell(layout.header_row, column).is_empty() {
                continue;
            }

            let feature = Feature::from_sheet(sheet, column, layout)?;
            if let Some(previous) = features.get(&feature.name) {
                match duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(ModelError::DuplicateFeature {
                            model: sheet.name.clone(),
                            feature: feature.name,
                        });
                    }
                    DuplicatePolicy::LastWins => {
                        tracing::warn!(
                            model = %sheet.name,
                            feature = %feature.name,
                            "feature in {} replaces the one in {}",
                            cell_ref(layout.header_row, column),
                            cell_ref(layout.header_row, previous.column),
                        );
                    }
                }
            }
            features.insert(feature.name.clone(), feature);
        }

        Ok(Self::with_features(sheet.name.clone(), base, features))
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.index.get(name).map(|&i| &self.features[i])
    }

    /// Features in source column order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Evaluate a contract and report what every feature contributed.
    ///
    /// Never fails: a missing field or an unknown modality leaves the score
    /// unchanged. Features are applied in column order so the floating point
    /// result does not depend on map iteration order.
    pub fn evaluate(&self, contract: &Contract) -> Evaluation {
        let mut score = self.base;
        let mut evaluations = Vec::with_capacity(self.features.len());

        for feature in &self.features {
            let outcome = match contract.get(&feature.name) {
                None => {
                    tracing::debug!(model = %self.name, feature = %feature.name, "not in contract");
                    FeatureOutcome::NotFound
                }
                Some(raw) => {
                    let value = raw.to_string();
                    match feature.coefficient(&value) {
                        Some(coefficient) => {
                            score *= coefficient;
                            tracing::debug!(
                                model = %self.name,
                                feature = %feature.name,
                                value = %value,
                                coefficient,
                                "matched"
                            );
                            FeatureOutcome::Matched { value, coefficient }
                        }
                        None => {
                            let known: Vec<_> = feature.modalities().take(4).map(|(m, _)| m).collect();
                            tracing::debug!(
                                model = %self.name,
                                feature = %feature.name,
                                value = %value,
                                key = %normalize_key(&value),
                                "value not in {:?}...",
                                known
                            );
                            FeatureOutcome::Unmatched { value }
                        }
                    }
                }
            };

            evaluations.push(FeatureEvaluation {
                feature: feature.name.clone(),
                outcome,
            });
        }

        Evaluation {
            base: self.base,
            score,
            features: evaluations,
        }
    }

    /// Score a contract. When `diagnostics` is given, every feature name is
    /// recorded as matched, unmatched or not found; the score is the same
    /// either way.
    pub fn calculate(&self, contract: &Contract, diagnostics: Option<&mut Diagnostics>) -> f64 {
        let evaluation = self.evaluate(contract);
        if let Some(diagnostics) = diagnostics {
            diagnostics.record(&evaluation);
        }
        evaluation.score
    }
}

fn read_base(sheet: &Sheet, layout: &SheetLayout) -> Result<f64, ModelError> {
    let marker = sheet.cell(layout.base_row, layout.base_col);
    if marker.to_string() != layout.base_marker {
        return Err(ModelError::MissingBase {
            model: sheet.name.clone(),
            marker: layout.base_marker.clone(),
            cell: cell_ref(layout.base_row, layout.base_col),
        });
    }

    let value = sheet.cell(layout.base_row, layout.base_col + 1);
    value.as_f64().ok_or_else(|| ModelError::InvalidBase {
        model: sheet.name.clone(),
        cell: cell_ref(layout.base_row, layout.base_col + 1),
        value: value.to_string(),
    })
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model : {}", self.name)?;
        writeln!(f, "Base : {}", self.base)?;
        writeln!(f, "Features : ")?;
        for feature in &self.features {
            writeln!(f, "{}", feature)?;
        }
        Ok(())
    }
}
