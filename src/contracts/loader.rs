use super::Contract;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("failed to open contracts file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid csv in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid json in {} (expected an array of flat objects): {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported contracts format for {} (expected .csv or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Load contract records from a `.csv` (header row + one contract per line)
/// or `.json` (array of objects) file.
///
/// CSV values are kept as text and blank cells are left out of the contract,
/// so they count as absent rather than as an empty modality.
pub fn load_contracts(path: &Path) -> Result<Vec<Contract>, ContractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let contracts = match extension.as_deref() {
        Some("csv") => load_csv(path)?,
        Some("json") => load_json(path)?,
        _ => return Err(ContractError::UnsupportedFormat(path.to_path_buf())),
    };

    tracing::debug!(path = %path.display(), count = contracts.len(), "loaded contracts");
    Ok(contracts)
}

fn load_csv(path: &Path) -> Result<Vec<Contract>, ContractError> {
    let csv_error = |source| ContractError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut contracts = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let contract: Contract = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .collect();
        contracts.push(contract);
    }
    Ok(contracts)
}

fn load_json(path: &Path) -> Result<Vec<Contract>, ContractError> {
    let file = File::open(path).map_err(|source| ContractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ContractError::Json {
        path: path.to_path_buf(),
        source,
    })
}
