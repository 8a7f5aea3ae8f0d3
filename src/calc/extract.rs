//! Reads projected values out of a recalculated workbook

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, warn};

use crate::error::IllustrationError;
use crate::layout::CalcLayout;
use crate::plan::{round_cents, ProjectionResult};

/// Extract one projected value per report year from a recalculated file
///
/// A cell-level defect (year missing from the table, cell outside the used
/// range, non-numeric content) substitutes zero with a warning; the result
/// always carries one entry per requested year. An unreadable file or a
/// missing sheet fails the whole extraction.
pub fn extract_results(
    path: &Path,
    layout: &CalcLayout,
    report_years: &[u32],
) -> Result<ProjectionResult, IllustrationError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IllustrationError::workbook(path, e))?;

    if !workbook.sheet_names().iter().any(|n| n == &layout.sheet) {
        return Err(IllustrationError::SheetMissing {
            sheet: layout.sheet.clone(),
            path: path.to_path_buf(),
        });
    }
    let range = workbook
        .worksheet_range(&layout.sheet)
        .map_err(|e| IllustrationError::workbook(path, e))?;

    let mut result = ProjectionResult::new();
    for &year in report_years {
        let value = match layout.year_cell(year) {
            Some(cell) => match range.get_value(cell.range_position()) {
                Some(Data::Float(f)) => *f,
                Some(Data::Int(i)) => *i as f64,
                Some(other) => {
                    warn!("year {} cell {} is not numeric ({:?}); using 0", year, cell, other);
                    0.0
                }
                None => {
                    warn!("year {} cell {} is empty; using 0", year, cell);
                    0.0
                }
            },
            None => {
                warn!("year {} has no cell mapping; using 0", year);
                0.0
            }
        };
        result.push(year, round_cents(value));
    }
    debug!("extracted {} values from {}", result.len(), path.display());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    /// TRST workbook with plain numbers standing in for cached formula results
    fn write_calculated(dir: &Path) -> PathBuf {
        let path = dir.join("calculated_no_withdrawal.xlsx");
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.set_name("TRST");
        sheet.get_cell_mut("G74").set_value_number(49_500.0);
        sheet.get_cell_mut("G79").set_value_number(47_000.455);
        sheet.get_cell_mut("G84").set_value_string("#REF!");
        // G89 left absent entirely
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
        path
    }

    #[test]
    fn test_extracts_numbers_and_rounds_to_cents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_calculated(dir.path());

        let result = extract_results(&path, &CalcLayout::default_trst(), &[10, 15]).unwrap();
        assert_eq!(result.len(), 2);
        assert_relative_eq!(result.value_for(10).unwrap(), 49_500.0);
        assert_relative_eq!(result.value_for(15).unwrap(), 47_000.46);
    }

    #[test]
    fn test_defective_cells_become_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_calculated(dir.path());

        // 20 -> text cell, 25 -> absent cell, 99 -> no mapping at all
        let years = [10, 20, 25, 99];
        let result = extract_results(&path, &CalcLayout::default_trst(), &years).unwrap();

        assert_eq!(result.len(), years.len());
        assert_relative_eq!(result.value_for(10).unwrap(), 49_500.0);
        assert_relative_eq!(result.value_for(20).unwrap(), 0.0);
        assert_relative_eq!(result.value_for(25).unwrap(), 0.0);
        assert_relative_eq!(result.value_for(99).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_sheet_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrong.xlsx");
        let book = umya_spreadsheet::new_file();
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        let err = extract_results(&path, &CalcLayout::default_trst(), &[10]).unwrap_err();
        assert!(matches!(err, IllustrationError::SheetMissing { .. }));
    }

    #[test]
    fn test_unreadable_file_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xlsx");
        let err = extract_results(&path, &CalcLayout::default_trst(), &[10]).unwrap_err();
        assert!(matches!(err, IllustrationError::Workbook { .. }));
    }
}
