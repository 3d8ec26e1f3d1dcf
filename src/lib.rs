//! Score contracts against multiplicative coefficient models.
//!
//! A workbook holds one model per sheet: a base coefficient and categorical
//! features mapping each (normalized) modality to a coefficient. A contract's
//! score under a model is the base multiplied by the coefficient of every
//! feature whose value it matches.
//!
//! ```no_run
//! use contract_scorer::config::Config;
//! use contract_scorer::contracts::Contract;
//! use contract_scorer::scoring::ModelRegistry;
//!
//! let registry = ModelRegistry::load("models.xlsx".as_ref(), &Config::default())?;
//! let contract: Contract = [("NUMCNT", "C-001"), ("AGE", "young")].into_iter().collect();
//! let scored = registry.score(&contract, None)?;
//! println!("{:?}", scored.score("AUTO"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod contracts;
pub mod normalize;
pub mod output;
pub mod scoring;
pub mod telemetry;
pub mod workbook;
