//! Writes scenario inputs into copies of the calculation template
//!
//! Only the cells named by the layout table are touched; every other cell,
//! style, and formula in the template copy is preserved. Formulas are NOT
//! evaluated here; that is the recalculation driver's job.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::IllustrationError;
use crate::layout::{CalcLayout, CellRef, InputField};
use crate::plan::ScenarioInputs;

/// A value bound for a single workbook cell
///
/// Shared by the input writer and the report renderer: numbers stay
/// numeric, everything else is coerced to text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Write this value into `cell` on `sheet`
    pub(crate) fn write_into(&self, sheet: &mut umya_spreadsheet::Worksheet, cell: &CellRef) {
        let coord = cell.to_string();
        match self {
            CellValue::Number(n) => {
                sheet.get_cell_mut(coord.as_str()).set_value_number(*n);
                debug!("wrote {} = {}", coord, n);
            }
            CellValue::Text(s) => {
                sheet.get_cell_mut(coord.as_str()).set_value_string(s.clone());
                debug!("wrote {} = '{}'", coord, s);
            }
        }
    }
}

/// The (cell, value) pairs one scenario writes, in table order
pub fn scenario_cell_values(
    layout: &CalcLayout,
    inputs: &ScenarioInputs,
) -> Vec<(CellRef, CellValue)> {
    layout
        .input_cells
        .iter()
        .map(|(field, cell)| {
            let value = match field {
                InputField::Premium => CellValue::Number(inputs.premium),
                InputField::WithdrawalStartYear => {
                    CellValue::Number(inputs.withdrawal_start_year as f64)
                }
                InputField::WithdrawalAmount => CellValue::Number(inputs.withdrawal_amount),
            };
            (*cell, value)
        })
        .collect()
}

/// Copy the calculation template to `dest` and write one scenario's inputs
pub fn write_scenario_input(
    template: &Path,
    dest: &Path,
    layout: &CalcLayout,
    inputs: &ScenarioInputs,
) -> Result<(), IllustrationError> {
    if !template.is_file() {
        return Err(IllustrationError::TemplateMissing(template.to_path_buf()));
    }
    fs::copy(template, dest)?;

    let mut book = umya_spreadsheet::reader::xlsx::read(dest)
        .map_err(|e| IllustrationError::workbook(dest, e))?;
    let sheet = book
        .get_sheet_by_name_mut(&layout.sheet)
        .ok_or_else(|| IllustrationError::SheetMissing {
            sheet: layout.sheet.clone(),
            path: dest.to_path_buf(),
        })?;

    for (cell, value) in scenario_cell_values(layout, inputs) {
        value.write_into(sheet, &cell);
    }

    umya_spreadsheet::writer::xlsx::write(&book, dest)
        .map_err(|e| IllustrationError::workbook(dest, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_inputs() -> ScenarioInputs {
        ScenarioInputs {
            premium: 10_000.0,
            withdrawal_start_year: 10,
            withdrawal_amount: 500.5,
        }
    }

    fn write_template(path: &Path) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.set_name("TRST");
        sheet.get_cell_mut("A1").set_value_string("Calculation template");
        sheet.get_cell_mut("C7").set_value_number(0.0);
        sheet.get_cell_mut("G74").set_formula("=C7*5");
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    #[test]
    fn test_writes_mapped_cells_and_preserves_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.xlsx");
        write_template(&template);
        let dest = dir.path().join("input_no_withdrawal.xlsx");

        write_scenario_input(&template, &dest, &CalcLayout::default_trst(), &test_inputs())
            .unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&dest).unwrap();
        let sheet = book.get_sheet_by_name("TRST").unwrap();
        assert_eq!(sheet.get_value("C7"), "10000");
        assert_eq!(sheet.get_value("F7"), "10");
        assert_eq!(sheet.get_value("F8"), "500.5");
        // untouched content and formulas survive the rewrite
        assert_eq!(sheet.get_value("A1"), "Calculation template");
        let formula = sheet.get_cell("G74").unwrap().get_formula();
        assert!(!formula.is_empty());

        // the template itself is untouched
        let original = umya_spreadsheet::reader::xlsx::read(&template).unwrap();
        assert_eq!(original.get_sheet_by_name("TRST").unwrap().get_value("C7"), "0");
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_scenario_input(
            &dir.path().join("nope.xlsx"),
            &dir.path().join("out.xlsx"),
            &CalcLayout::default_trst(),
            &test_inputs(),
        )
        .unwrap_err();
        assert!(matches!(err, IllustrationError::TemplateMissing(_)));
    }

    #[test]
    fn test_missing_sheet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.xlsx");
        let mut book = umya_spreadsheet::new_file();
        book.get_sheet_mut(&0).unwrap().set_name("NotTrst");
        umya_spreadsheet::writer::xlsx::write(&book, &template).unwrap();

        let err = write_scenario_input(
            &template,
            &dir.path().join("out.xlsx"),
            &CalcLayout::default_trst(),
            &test_inputs(),
        )
        .unwrap_err();
        assert!(matches!(err, IllustrationError::SheetMissing { .. }));
    }

    #[test]
    fn test_scenario_cell_values_follow_the_table() {
        let layout = CalcLayout::default_trst();
        let values = scenario_cell_values(&layout, &test_inputs());

        assert_eq!(values.len(), 3);
        assert_eq!(values[0].0.to_string(), "C7");
        assert_eq!(values[0].1, CellValue::Number(10_000.0));
        assert_eq!(values[1].1, CellValue::Number(10.0));
    }

    #[test]
    fn test_write_into_coerces_by_variant() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();

        CellValue::Number(1_234.5).write_into(sheet, &CellRef::parse("C7").unwrap());
        CellValue::Text("plan notes".to_string()).write_into(sheet, &CellRef::parse("C9").unwrap());

        assert_eq!(sheet.get_value("C7"), "1234.5");
        assert_eq!(sheet.get_value("C9"), "plan notes");
    }
}
