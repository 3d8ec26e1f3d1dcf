use super::{Cell, Sheet, Workbook, WorkbookError};
use std::fs;
use std::path::Path;

/// Read a directory of `.csv` files as a workbook, one sheet per file.
///
/// Sheet names are the file stems; sheets are ordered by file name so the
/// result does not depend on directory listing order.
pub(super) fn read_dir(dir: &Path) -> Result<Workbook, WorkbookError> {
    let io_error = |source| WorkbookError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(WorkbookError::NoSheets(dir.to_path_buf()));
    }

    let sheets = paths
        .iter()
        .map(|p| read_sheet(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Workbook::new(sheets))
}

/// Read one CSV file as a sheet. Every row is kept (no header handling) and
/// rows may have different lengths. Cells stay text so that modality codes
/// such as `01` keep their leading zeros.
pub(super) fn read_sheet(path: &Path) -> Result<Sheet, WorkbookError> {
    let csv_error = |source| WorkbookError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(|source| WorkbookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());

    // The csv reader skips blank lines, which are layout rows here, and a quoted
    // cell may span several lines while still being one row. Insert one empty
    // row per blank line found between the end of a record and the start of
    // the next.
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut last_line = 0;
    while reader.read_record(&mut record).map_err(csv_error)? {
        let consumed = reader.position().byte() as usize;
        let end_line = line_of_last_content(&bytes[..consumed.min(bytes.len())]);
        let embedded: usize = record.iter().map(|field| field.matches('\n').count()).sum();
        let start_line = end_line.saturating_sub(embedded);

        let blank_lines = start_line.saturating_sub(last_line + 1);
        rows.resize(rows.len() + blank_lines, Vec::new());
        rows.push(record.iter().map(Cell::from_text).collect());
        last_line = end_line;
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    tracing::debug!(sheet = %name, rows = rows.len(), "read csv sheet");
    Ok(Sheet::new(name, rows))
}

/// 1-based line holding the last non-terminator byte of `consumed`.
fn line_of_last_content(consumed: &[u8]) -> usize {
    let content_end = consumed
        .iter()
        .rposition(|b| !matches!(b, b'\r' | b'\n'))
        .map_or(0, |i| i + 1);
    1 + consumed[..content_end].iter().filter(|&&b| b == b'\n').count()
}
