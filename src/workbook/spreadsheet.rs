use super::{Cell, Sheet, Workbook, WorkbookError};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// Read every worksheet of an Excel/ODS file, in workbook order.
pub(super) fn read(path: &Path) -> Result<Workbook, WorkbookError> {
    let spreadsheet_error = |source| WorkbookError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_error)?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(spreadsheet_error)?;
        tracing::debug!(sheet = %name, rows = range.height(), "read worksheet");
        sheets.push(Sheet::new(name, anchor_at_a1(&range)));
    }

    if sheets.is_empty() {
        return Err(WorkbookError::NoSheets(path.to_path_buf()));
    }

    Ok(Workbook::new(sheets))
}

/// calamine ranges start at the first used cell; pad so indices count from A1.
fn anchor_at_a1(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    rows
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::from_text(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cell_conversions() {
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(to_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(
            to_cell(&Data::String("Base".to_string())),
            Cell::Text("Base".to_string())
        );
        assert_eq!(to_cell(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(to_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(to_cell(&Data::Bool(true)), Cell::Bool(true));
    }

    #[test]
    fn test_anchor_pads_leading_rows_and_columns() {
        let mut range: Range<Data> = Range::new((1, 1), (1, 2));
        range.set_value((1, 1), Data::String("Base".to_string()));
        range.set_value((1, 2), Data::Float(2.0));

        let rows = anchor_at_a1(&range);
        let sheet = Sheet::new("S", rows);
        assert!(sheet.cell(0, 0).is_empty());
        assert!(sheet.cell(1, 0).is_empty());
        assert_eq!(sheet.cell(1, 1), &Cell::Text("Base".to_string()));
        assert_eq!(sheet.cell(1, 2), &Cell::Number(2.0));
    }

    #[test]
    fn test_anchor_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(anchor_at_a1(&range).is_empty());
    }
}
