use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use crate::scoring::ScoredContract;

/// Write scored contracts to a CSV file atomically
///
/// One column per model, header row with model names. Uses atomic-write-file
/// so an interrupted run never leaves a half-written result file.
pub fn write_csv(path: &Path, columns: &[String], rows: &[ScoredContract]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    write_rows(&mut file, columns, rows)?;

    file.commit()
        .with_context(|| format!("Failed to save results to {}", path.display()))?;

    Ok(())
}

/// Render scored contracts as CSV text (for stdout)
pub fn format_csv(columns: &[String], rows: &[ScoredContract]) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, columns, rows)?;
    let text = String::from_utf8(buffer).context("CSV output is not valid UTF-8")?;
    Ok(text.trim_end_matches('\n').to_string())
}

fn write_rows<W: Write>(out: W, columns: &[String], rows: &[ScoredContract]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(columns)
        .context("Failed to write CSV header")?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|name| row.get(name).map(|o| o.to_string()).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::FieldValue;
    use crate::scoring::Outcome;

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let columns = vec!["NUMCNT".to_string(), "AUTO".to_string()];
        let rows = vec![ScoredContract {
            outcomes: vec![
                ("NUMCNT".to_string(), Outcome::Identifier(FieldValue::from("C-1"))),
                ("AUTO".to_string(), Outcome::Score(1.5)),
            ],
        }];

        write_csv(&path, &columns, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "NUMCNT,AUTO\nC-1,1.5\n");
    }

    #[test]
    fn test_format_csv_quotes_separators() {
        let columns = vec!["NUMCNT".to_string(), "AUTO".to_string()];
        let rows = vec![ScoredContract {
            outcomes: vec![
                ("NUMCNT".to_string(), Outcome::Identifier(FieldValue::from("A,1"))),
                ("AUTO".to_string(), Outcome::Score(2.0)),
            ],
        }];

        let rendered = format_csv(&columns, &rows).unwrap();
        assert_eq!(rendered, "NUMCNT,AUTO\n\"A,1\",2");
    }
}
