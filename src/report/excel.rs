//! Renders the report workbook from a scenario set
//!
//! Fills the header cells, the withdrawal description cells, and the
//! results grid. Scenarios absent from the set have their grid cells
//! blanked so the template never shows stale data. The workbook is
//! returned as xlsx bytes; nothing is written to disk here.

use std::io::Cursor;
use std::path::Path;

use log::warn;

use crate::calc::CellValue;
use crate::error::IllustrationError;
use crate::layout::ReportLayout;
use crate::plan::{ScenarioSet, WithdrawalPlan};

/// Populate the report template and return it as xlsx bytes
pub fn render_report(
    template: &Path,
    layout: &ReportLayout,
    set: &ScenarioSet,
) -> Result<Vec<u8>, IllustrationError> {
    if !template.is_file() {
        return Err(IllustrationError::TemplateMissing(template.to_path_buf()));
    }
    let mut book = umya_spreadsheet::reader::xlsx::read(template)
        .map_err(|e| IllustrationError::workbook(template, e))?;

    let sheet_name = if book.get_sheet_by_name(&layout.sheet).is_some() {
        layout.sheet.clone()
    } else {
        let first = book
            .get_sheet(&0)
            .map(|s| s.get_name().to_string())
            .ok_or_else(|| IllustrationError::SheetMissing {
                sheet: layout.sheet.clone(),
                path: template.to_path_buf(),
            })?;
        warn!("report sheet '{}' not found; using '{}'", layout.sheet, first);
        first
    };
    let sheet = book
        .get_sheet_by_name_mut(&sheet_name)
        .ok_or_else(|| IllustrationError::SheetMissing {
            sheet: sheet_name.clone(),
            path: template.to_path_buf(),
        })?;

    let params = &set.parameters;

    // header
    CellValue::Text(params.client_name.clone()).write_into(sheet, &layout.client_name_cell);
    CellValue::Number(params.premium).write_into(sheet, &layout.premium_cell);
    CellValue::Number(params.total_premium()).write_into(sheet, &layout.total_premium_cell);

    // withdrawal descriptions
    for (kind, cells) in &layout.withdrawal_text_cells {
        let lines = withdrawal_lines(params.withdrawal(*kind));
        for (cell, line) in cells.iter().zip(lines.iter()) {
            CellValue::Text(line.clone()).write_into(sheet, cell);
        }
    }

    // results grid
    for (kind, _) in &layout.scenario_columns {
        let result = set.result(*kind);
        for (idx, &year) in params.report_years.iter().enumerate() {
            let cell = match layout.result_cell(*kind, idx) {
                Some(cell) => cell,
                None => continue,
            };
            match result.and_then(|r| r.value_for(year)) {
                Some(value) => CellValue::Number(value).write_into(sheet, &cell),
                None => CellValue::Text(String::new()).write_into(sheet, &cell),
            }
        }
    }

    let mut buffer = Vec::new();
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut Cursor::new(&mut buffer))
        .map_err(|e| IllustrationError::workbook(template, e))?;
    Ok(buffer)
}

/// Two description lines for a withdrawal plan slot
fn withdrawal_lines(plan: Option<&WithdrawalPlan>) -> [String; 2] {
    match plan {
        Some(p) if p.is_active() => [
            format!("Withdraw {} per year", format_amount(p.amount)),
            format!("from policy year {}", p.start_year),
        ],
        _ => ["No withdrawal plan configured".to_string(), String::new()],
    }
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{simplified, PlanParameters, REPORT_YEARS};
    use std::fs;
    use std::path::PathBuf;

    fn write_template(dir: &Path, sheet_name: &str) -> PathBuf {
        let path = dir.join("report_template.xlsx");
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.set_name(sheet_name);
        sheet.get_cell_mut("A1").set_value_string("Client");
        sheet.get_cell_mut("D12").set_value_number(999_999.0); // stale data
        sheet.get_cell_mut("F25").set_value_number(999_999.0); // stale data
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
        path
    }

    fn reopen(dir: &Path, bytes: &[u8]) -> umya_spreadsheet::Spreadsheet {
        let path = dir.join("rendered.xlsx");
        fs::write(&path, bytes).unwrap();
        umya_spreadsheet::reader::xlsx::read(&path).unwrap()
    }

    fn test_params() -> PlanParameters {
        let mut params = PlanParameters::new("Test Client", 10_000.0);
        params.calculation_date = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        params
    }

    #[test]
    fn test_header_and_total_premium() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), "Sheet1");
        let set = simplified::project_scenarios(&test_params());

        let bytes = render_report(&template, &ReportLayout::default_report(), &set).unwrap();
        let book = reopen(dir.path(), &bytes);
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();

        assert_eq!(sheet.get_value("B1"), "Test Client");
        assert_eq!(sheet.get_value("B5"), "10000");
        assert_eq!(sheet.get_value("B6"), "50000");
    }

    #[test]
    fn test_single_scenario_blanks_other_columns() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), "Sheet1");
        let set = simplified::project_scenarios(&test_params());
        assert_eq!(set.len(), 1);

        let bytes = render_report(&template, &ReportLayout::default_report(), &set).unwrap();
        let book = reopen(dir.path(), &bytes);
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();

        for idx in 0..REPORT_YEARS.len() {
            let row = 12 + idx;
            assert!(!sheet.get_value(format!("B{}", row).as_str()).is_empty());
            // stale template data is cleared, not left behind
            assert_eq!(sheet.get_value(format!("D{}", row).as_str()), "");
            assert_eq!(sheet.get_value(format!("F{}", row).as_str()), "");
        }
    }

    #[test]
    fn test_two_scenarios_populate_their_columns() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), "Sheet1");
        let set = simplified::project_scenarios(&test_params().with_withdrawal_a(10, 500.0));
        assert_eq!(set.len(), 2);

        let bytes = render_report(&template, &ReportLayout::default_report(), &set).unwrap();
        let book = reopen(dir.path(), &bytes);
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();

        for idx in 0..REPORT_YEARS.len() {
            let row = 12 + idx;
            assert!(!sheet.get_value(format!("B{}", row).as_str()).is_empty());
            assert!(!sheet.get_value(format!("D{}", row).as_str()).is_empty());
            assert_eq!(sheet.get_value(format!("F{}", row).as_str()), "");
        }
        assert_eq!(sheet.get_value("B12"), "50000");
        assert_eq!(sheet.get_value("D12"), "49500");
    }

    #[test]
    fn test_withdrawal_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), "Sheet1");
        let set = simplified::project_scenarios(&test_params().with_withdrawal_a(10, 500.0));

        let bytes = render_report(&template, &ReportLayout::default_report(), &set).unwrap();
        let book = reopen(dir.path(), &bytes);
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();

        assert_eq!(sheet.get_value("C9"), "Withdraw 500 per year");
        assert_eq!(sheet.get_value("C10"), "from policy year 10");
        assert_eq!(sheet.get_value("E9"), "No withdrawal plan configured");
        assert_eq!(sheet.get_value("E10"), "");
    }

    #[test]
    fn test_falls_back_to_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), "Overview");
        let set = simplified::project_scenarios(&test_params());

        let bytes = render_report(&template, &ReportLayout::default_report(), &set).unwrap();
        let book = reopen(dir.path(), &bytes);
        let sheet = book.get_sheet_by_name("Overview").unwrap();
        assert_eq!(sheet.get_value("B1"), "Test Client");
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let set = simplified::project_scenarios(&test_params());
        let err = render_report(
            &dir.path().join("nope.xlsx"),
            &ReportLayout::default_report(),
            &set,
        )
        .unwrap_err();
        assert!(matches!(err, IllustrationError::TemplateMissing(_)));
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(500.0), "500");
        assert_eq!(format_amount(500.5), "500.50");
    }
}
