use super::error::ScoringError;
use crate::contracts::{Contract, FieldValue};

/// Pass-through "model" for the contract identifier column.
///
/// Unlike ordinary features, the identifier is required: a contract without
/// it is an error rather than a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityModel {
    field: String,
}

impl IdentityModel {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// The identifier value exactly as the contract holds it.
    pub fn calculate(&self, contract: &Contract) -> Result<FieldValue, ScoringError> {
        contract
            .get(&self.field)
            .cloned()
            .ok_or_else(|| ScoringError::MissingIdentifier {
                field: self.field.clone(),
            })
    }
}
