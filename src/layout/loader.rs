//! CSV overrides for the cell layout tables
//!
//! Each file is a two-column CSV with a header row. `input_cells.csv` maps
//! parameter names to cells (`parameter,cell`); `year_cells.csv` maps report
//! years to cells (`year,cell`).

use std::path::Path;

use serde::Deserialize;

use super::{CellRef, InputField};
use crate::error::IllustrationError;

/// Directory probed for layout override files when none is given
pub const DEFAULT_LAYOUT_PATH: &str = "data/layout";

#[derive(Debug, Deserialize)]
struct InputCellRow {
    parameter: String,
    cell: String,
}

#[derive(Debug, Deserialize)]
struct YearCellRow {
    year: u32,
    cell: String,
}

/// Load the parameter -> cell table from `input_cells.csv`
pub fn load_input_cells(path: &Path) -> Result<Vec<(InputField, CellRef)>, IllustrationError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut cells = Vec::new();
    for row in reader.deserialize() {
        let row: InputCellRow = row.map_err(|e| csv_error(path, e))?;
        let field = InputField::from_name(row.parameter.trim()).ok_or_else(|| {
            IllustrationError::Layout(format!(
                "unknown parameter '{}' in {}",
                row.parameter,
                path.display()
            ))
        })?;
        cells.push((field, CellRef::parse(&row.cell)?));
    }
    if cells.is_empty() {
        return Err(IllustrationError::Layout(format!(
            "no rows in {}",
            path.display()
        )));
    }
    Ok(cells)
}

/// Load the year -> cell table from `year_cells.csv`
pub fn load_year_cells(path: &Path) -> Result<Vec<(u32, CellRef)>, IllustrationError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut cells = Vec::new();
    for row in reader.deserialize() {
        let row: YearCellRow = row.map_err(|e| csv_error(path, e))?;
        cells.push((row.year, CellRef::parse(&row.cell)?));
    }
    if cells.is_empty() {
        return Err(IllustrationError::Layout(format!(
            "no rows in {}",
            path.display()
        )));
    }
    Ok(cells)
}

fn csv_error(path: &Path, e: csv::Error) -> IllustrationError {
    IllustrationError::Layout(format!("{}: {}", path.display(), e))
}
