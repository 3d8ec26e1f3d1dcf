//! Read-only view of a scoring workbook: a list of named sheets, each a grid
//! of cells anchored at A1.
//!
//! Spreadsheet files go through calamine; a directory of CSV files (one sheet
//! per file) is accepted too, which is handy for version-controlled models.

mod csv_dir;
mod spreadsheet;

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("workbook not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported workbook format for {} (expected xlsx, xlsm, xlsb, xls, ods, csv or a directory of csv files)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read spreadsheet {}: {source}", .path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read csv sheet {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no sheets found in {}", .0.display())]
    NoSheets(PathBuf),
}

/// A single cell value as read from the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Builds a cell from raw text; blank strings become `Empty`.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric value of the cell. Text is trimmed and parsed; non-finite
    /// values are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One worksheet. Row and column indices are 0-based from A1.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Cell at (row, col); anything outside the grid reads as `Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Number of columns present in `row` (0 if the row does not exist).
    pub fn row_width(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Test helper: builds a sheet from a text grid, numeric strings become numbers.
    #[cfg(test)]
    pub(crate) fn from_grid(name: &str, grid: &[&[&str]]) -> Self {
        let rows = grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| match s.parse::<f64>() {
                        Ok(n) => Cell::Number(n),
                        Err(_) => Cell::from_text(s),
                    })
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }
}

/// Spreadsheet-style reference ("B2") for a 0-based (row, col) pair.
pub fn cell_ref(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}

/// Ordered collection of sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Open a workbook from disk.
    ///
    /// Directories are read as one CSV sheet per file; `.csv` files are a
    /// single-sheet workbook; everything else is handed to calamine.
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        if !path.exists() {
            return Err(WorkbookError::NotFound(path.to_path_buf()));
        }

        if path.is_dir() {
            return csv_dir::read_dir(path);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::new(vec![csv_dir::read_sheet(path)?])),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods") => {
                spreadsheet::read(path)
            }
            _ => Err(WorkbookError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
