use crate::workbook::WorkbookError;
use thiserror::Error;

/// Errors raised while building a model from a sheet.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("base coefficient not found in model '{model}' (expected '{marker}' in {cell})")]
    MissingBase {
        model: String,
        marker: String,
        cell: String,
    },

    #[error("invalid base coefficient '{value}' in model '{model}' at {cell}")]
    InvalidBase {
        model: String,
        cell: String,
        value: String,
    },

    #[error("invalid coefficient '{value}' for feature '{feature}' in model '{model}' at {cell}")]
    InvalidCoefficient {
        model: String,
        feature: String,
        cell: String,
        value: String,
    },

    #[error("duplicate feature '{feature}' in model '{model}'")]
    DuplicateFeature { model: String, feature: String },
}

/// Errors raised while loading a whole workbook into a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error("failed to load sheet '{sheet}': {source}")]
    Model {
        sheet: String,
        #[source]
        source: ModelError,
    },

    #[error("duplicate model name '{0}'")]
    DuplicateModel(String),
}

/// Hard failures during evaluation. Absent or unknown feature values are not
/// errors; they simply do not contribute.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("contract has no '{field}' field")]
    MissingIdentifier { field: String },

    #[error("unknown model '{0}'")]
    UnknownModel(String),
}
