pub mod diagnostics;
pub mod error;
pub mod feature;
pub mod identity;
pub mod model;
pub mod registry;

pub use diagnostics::Diagnostics;
pub use error::{ModelError, RegistryError, ScoringError};
pub use feature::Feature;
pub use identity::IdentityModel;
pub use model::{Evaluation, FeatureEvaluation, FeatureOutcome, Model};
pub use registry::{ModelRegistry, Outcome, ScoredContract, ScoringModel};
