use super::diagnostics::Diagnostics;
use super::error::{RegistryError, ScoringError};
use super::identity::IdentityModel;
use super::model::Model;
use crate::config::{Config, DuplicatePolicy};
use crate::contracts::{Contract, FieldValue};
use crate::workbook::Workbook;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Either a coefficient model or the identifier pass-through; both answer
/// `calculate(contract)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringModel {
    Weighted(Model),
    Identity(IdentityModel),
}

/// Result of one model on one contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Score(f64),
    Identifier(FieldValue),
}

impl ScoringModel {
    pub fn calculate(
        &self,
        contract: &Contract,
        diagnostics: Option<&mut Diagnostics>,
    ) -> Result<Outcome, ScoringError> {
        match self {
            ScoringModel::Weighted(model) => {
                Ok(Outcome::Score(model.calculate(contract, diagnostics)))
            }
            ScoringModel::Identity(model) => model.calculate(contract).map(Outcome::Identifier),
        }
    }

    pub fn as_weighted(&self) -> Option<&Model> {
        match self {
            ScoringModel::Weighted(model) => Some(model),
            ScoringModel::Identity(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Score(score) => write!(f, "{}", score),
            Outcome::Identifier(value) => write!(f, "{}", value),
        }
    }
}

/// Outcomes of several models on one contract, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredContract {
    pub outcomes: Vec<(String, Outcome)>,
}

impl ScoredContract {
    pub fn get(&self, model: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, outcome)| outcome)
    }

    pub fn score(&self, model: &str) -> Option<f64> {
        match self.get(model)? {
            Outcome::Score(score) => Some(*score),
            Outcome::Identifier(_) => None,
        }
    }
}

/// All models of a workbook, keyed by sheet name, plus the identifier model.
///
/// Built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    order: Vec<String>,
    models: HashMap<String, ScoringModel>,
}

impl ModelRegistry {
    /// A registry holding only the identifier model.
    pub fn new(identifier_field: &str) -> Self {
        let mut registry = Self {
            order: Vec::new(),
            models: HashMap::new(),
        };
        registry.insert(
            identifier_field.to_string(),
            ScoringModel::Identity(IdentityModel::new(identifier_field)),
        );
        registry
    }

    /// Open a workbook and load every sheet as a model.
    pub fn load(path: &Path, config: &Config) -> Result<Self, RegistryError> {
        let workbook = Workbook::open(path)?;
        Self::from_workbook(&workbook, config)
    }

    /// Load every sheet of an already opened workbook. Any sheet that fails
    /// to parse aborts the whole load.
    pub fn from_workbook(workbook: &Workbook, config: &Config) -> Result<Self, RegistryError> {
        let mut registry = Self::new(&config.identifier_field);

        for sheet in &workbook.sheets {
            let model = Model::from_sheet(sheet, &config.layout, config.duplicates).map_err(
                |source| RegistryError::Model {
                    sheet: sheet.name.clone(),
                    source,
                },
            )?;
            tracing::info!(
                model = %model.name,
                base = model.base,
                features = model.features().len(),
                "loaded model"
            );
            registry.add(ScoringModel::Weighted(model), config.duplicates)?;
        }

        Ok(registry)
    }

    /// Add a model under its own name, applying the duplicate policy.
    pub fn add(&mut self, model: ScoringModel, duplicates: DuplicatePolicy) -> Result<(), RegistryError> {
        let name = match &model {
            ScoringModel::Weighted(m) => m.name.clone(),
            ScoringModel::Identity(m) => m.field().to_string(),
        };

        if self.models.contains_key(&name) {
            match duplicates {
                DuplicatePolicy::Reject => return Err(RegistryError::DuplicateModel(name)),
                DuplicatePolicy::LastWins => {
                    tracing::warn!(model = %name, "model replaces an earlier one with the same name");
                }
            }
        }

        self.insert(name, model);
        Ok(())
    }

    // Replacing keeps the original position.
    fn insert(&mut self, name: String, model: ScoringModel) {
        if self.models.insert(name.clone(), model).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScoringModel> {
        self.models.get(name)
    }

    /// Model names, identifier first, then sheets in workbook order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoringModel)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), &self.models[name]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Evaluate every model on `contract`.
    pub fn score(
        &self,
        contract: &Contract,
        diagnostics: Option<&mut Diagnostics>,
    ) -> Result<ScoredContract, ScoringError> {
        self.score_with(&self.order, contract, diagnostics)
    }

    /// Evaluate the named models on `contract`, in the given order.
    pub fn score_with<S: AsRef<str>>(
        &self,
        names: &[S],
        contract: &Contract,
        mut diagnostics: Option<&mut Diagnostics>,
    ) -> Result<ScoredContract, ScoringError> {
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let model = self
                .get(name)
                .ok_or_else(|| ScoringError::UnknownModel(name.to_string()))?;
            let outcome = model.calculate(contract, diagnostics.as_deref_mut())?;
            outcomes.push((name.to_string(), outcome));
        }
        Ok(ScoredContract { outcomes })
    }
}

impl fmt::Display for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, model)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match model {
                ScoringModel::Weighted(model) => write!(f, "{}", model)?,
                ScoringModel::Identity(_) => writeln!(f, "Model : {} (identifier)", name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Feature, ModelError};
    use crate::workbook::Sheet;
    use std::fs;

    fn model_sheet(name: &str, base: &str) -> Sheet {
        Sheet::from_grid(
            name,
            &[
                &[],
                &["", "Base", base],
                &[],
                &["AGE"],
                &[],
                &["Age band"],
                &["young", "0.5"],
                &["old", "1.5"],
            ],
        )
    }

    fn age_contract(id: i64, age: &str) -> Contract {
        let mut contract = Contract::new();
        contract.insert("NUMCNT", id);
        contract.insert("AGE", age);
        contract
    }

    #[test]
    fn test_identity_model_always_present() {
        let registry = ModelRegistry::from_workbook(&Workbook::default(), &Config::default()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(matches!(registry.get("NUMCNT"), Some(ScoringModel::Identity(_))));
    }

    #[test]
    fn test_identity_model_uses_configured_field() {
        let config = Config {
            identifier_field: "POLICY".to_string(),
            ..Config::default()
        };
        let registry = ModelRegistry::from_workbook(&Workbook::default(), &config).unwrap();
        assert!(registry.get("NUMCNT").is_none());
        assert!(registry.get("POLICY").is_some());
    }

    #[test]
    fn test_loads_sheets_in_order() {
        let workbook = Workbook::new(vec![model_sheet("AUTO", "2"), model_sheet("HOME", "3")]);
        let registry = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["NUMCNT", "AUTO", "HOME"]);
        assert_eq!(registry.get("HOME").and_then(ScoringModel::as_weighted).map(|m| m.base), Some(3.0));
    }

    #[test]
    fn test_score_all_models() {
        let workbook = Workbook::new(vec![model_sheet("AUTO", "2"), model_sheet("HOME", "3")]);
        let registry = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap();

        let scored = registry.score(&age_contract(42, "Young"), None).unwrap();
        assert_eq!(scored.get("NUMCNT"), Some(&Outcome::Identifier(FieldValue::Integer(42))));
        assert_eq!(scored.score("AUTO"), Some(1.0));
        assert_eq!(scored.score("HOME"), Some(1.5));
        assert_eq!(scored.score("NUMCNT"), None);
    }

    #[test]
    fn test_score_missing_identifier_fails() {
        let registry = ModelRegistry::from_workbook(&Workbook::default(), &Config::default()).unwrap();
        let contract: Contract = [("AGE", "young")].into_iter().collect();
        assert_eq!(
            registry.score(&contract, None),
            Err(ScoringError::MissingIdentifier {
                field: "NUMCNT".to_string()
            })
        );
    }

    #[test]
    fn test_score_with_subset_and_unknown() {
        let workbook = Workbook::new(vec![model_sheet("AUTO", "2"), model_sheet("HOME", "3")]);
        let registry = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap();
        let contract = age_contract(1, "old");

        let scored = registry.score_with(&["HOME"], &contract, None).unwrap();
        assert_eq!(scored.outcomes.len(), 1);
        assert_eq!(scored.score("HOME"), Some(4.5));

        assert_eq!(
            registry.score_with(&["MOTO"], &contract, None),
            Err(ScoringError::UnknownModel("MOTO".to_string()))
        );
    }

    #[test]
    fn test_diagnostics_across_models() {
        let workbook = Workbook::new(vec![model_sheet("AUTO", "2")]);
        let registry = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap();
        let mut diagnostics = Diagnostics::new();

        registry.score(&age_contract(1, "young"), Some(&mut diagnostics)).unwrap();
        registry.score(&age_contract(2, "middle"), Some(&mut diagnostics)).unwrap();
        let mut no_age = Contract::new();
        no_age.insert("NUMCNT", 3i64);
        registry.score(&no_age, Some(&mut diagnostics)).unwrap();

        assert!(diagnostics.matched.contains("AGE"));
        assert!(diagnostics.unmatched.contains("AGE"));
        assert!(diagnostics.not_found.contains("AGE"));
    }

    #[test]
    fn test_bad_sheet_aborts_load() {
        let workbook = Workbook::new(vec![model_sheet("AUTO", "2"), model_sheet("HOME", "abc")]);
        let err = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap_err();
        match err {
            RegistryError::Model { sheet, source } => {
                assert_eq!(sheet, "HOME");
                assert!(matches!(source, ModelError::InvalidBase { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_base_names_sheet() {
        let broken = Sheet::from_grid("MOTO", &[&[], &["", "Coef", "2"]]);
        let workbook = Workbook::new(vec![broken]);
        let err = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("'MOTO'"));
    }

    #[test]
    fn test_duplicate_sheet_last_wins() {
        let workbook = Workbook::new(vec![
            model_sheet("AUTO", "2"),
            model_sheet("HOME", "3"),
            model_sheet("AUTO", "5"),
        ]);
        let registry = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["NUMCNT", "AUTO", "HOME"]);
        assert_eq!(registry.get("AUTO").and_then(ScoringModel::as_weighted).map(|m| m.base), Some(5.0));
    }

    #[test]
    fn test_duplicate_sheet_rejected() {
        let workbook = Workbook::new(vec![model_sheet("AUTO", "2"), model_sheet("AUTO", "5")]);
        let config = Config {
            duplicates: DuplicatePolicy::Reject,
            ..Config::default()
        };
        let err = ModelRegistry::from_workbook(&workbook, &config).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateModel(ref name) if name == "AUTO"));
    }

    #[test]
    fn test_sheet_named_like_identifier_replaces_it() {
        let workbook = Workbook::new(vec![model_sheet("NUMCNT", "2")]);
        let registry = ModelRegistry::from_workbook(&workbook, &Config::default()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(matches!(registry.get("NUMCNT"), Some(ScoringModel::Weighted(_))));
    }

    #[test]
    fn test_load_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("AUTO.csv"),
            ",,\n,Base,2\n,,\nAGE,,\n,,\nAge band,,\nyoung,0.5,\nold,1.5,\n",
        )
        .unwrap();

        let registry = ModelRegistry::load(dir.path(), &Config::default()).unwrap();
        let scored = registry.score(&age_contract(7, "OLD"), None).unwrap();
        assert_eq!(scored.score("AUTO"), Some(3.0));
    }

    #[test]
    fn test_load_missing_workbook() {
        let err = ModelRegistry::load(Path::new("/no/such/models.xlsx"), &Config::default()).unwrap_err();
        assert!(matches!(err, RegistryError::Workbook(_)));
    }

    #[test]
    fn test_display_lists_identifier_first() {
        let mut registry = ModelRegistry::new("NUMCNT");
        registry
            .add(
                ScoringModel::Weighted(Model::new(
                    "AUTO",
                    2.0,
                    [Feature::new("AGE", "Age band", 0, [("young", 0.5)])],
                )),
                DuplicatePolicy::LastWins,
            )
            .unwrap();

        let rendered = registry.to_string();
        assert!(rendered.starts_with("Model : NUMCNT (identifier)\n\nModel : AUTO\n"));
    }
}
