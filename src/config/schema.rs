use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration.
///
/// Example YAML:
/// ```yaml
/// workbook: models.xlsx
/// identifier_field: NUMCNT
/// duplicates: last_wins
/// layout:
///   base_marker: Base
///   base_row: 1
///   base_col: 1
///   header_row: 3
///   label_row: 5
///   values_start_row: 6
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Workbook used when none is given on the command line
    #[serde(default)]
    pub workbook: Option<PathBuf>,

    /// Contract field returned verbatim by the identifier model, also its registry name
    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,

    /// What to do when two features (or two sheets) share a name
    #[serde(default)]
    pub duplicates: DuplicatePolicy,

    /// Cell positions of the model sheet layout
    #[serde(default)]
    pub layout: SheetLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: None,
            identifier_field: default_identifier_field(),
            duplicates: DuplicatePolicy::default(),
            layout: SheetLayout::default(),
        }
    }
}

fn default_identifier_field() -> String {
    "NUMCNT".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later feature/sheet replaces the earlier one (a warning is logged)
    #[default]
    LastWins,
    /// Duplicates abort loading
    Reject,
}

/// Where things live in a model sheet. All indices are 0-based from A1.
///
/// The base coefficient is read from the cell right of the marker; each
/// feature's coefficients sit in the column right of its modalities.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SheetLayout {
    pub base_marker: String,
    pub base_row: usize,
    pub base_col: usize,
    pub header_row: usize,
    pub label_row: usize,
    pub values_start_row: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            base_marker: "Base".to_string(),
            base_row: 1,
            base_col: 1,
            header_row: 3,
            label_row: 5,
            values_start_row: 6,
        }
    }
}
