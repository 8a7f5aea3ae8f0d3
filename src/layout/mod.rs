//! Cell layout tables for the calculation and report templates
//!
//! The templates are opaque to the pipeline; every coordinate it touches
//! lives in one of these tables, so a template change means editing (or
//! overriding via CSV) one table, not hunting for literals.

mod cellref;
pub mod loader;

pub use cellref::CellRef;

use std::path::Path;

use crate::error::IllustrationError;
use crate::plan::ScenarioKind;

/// Input parameters the calculation sheet accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Premium,
    WithdrawalStartYear,
    WithdrawalAmount,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::Premium => "premium",
            InputField::WithdrawalStartYear => "withdrawal_start_year",
            InputField::WithdrawalAmount => "withdrawal_amount",
        }
    }

    /// Reverse lookup used by the CSV override loader
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "premium" => Some(InputField::Premium),
            "withdrawal_start_year" => Some(InputField::WithdrawalStartYear),
            "withdrawal_amount" => Some(InputField::WithdrawalAmount),
            _ => None,
        }
    }
}

/// Where scenario inputs land and projected values live on the calculation sheet
#[derive(Debug, Clone)]
pub struct CalcLayout {
    /// Sheet holding the input cells and projected values
    pub sheet: String,
    /// Parameter -> input cell
    pub input_cells: Vec<(InputField, CellRef)>,
    /// Report year -> projected-value cell
    pub year_cells: Vec<(u32, CellRef)>,
}

impl CalcLayout {
    /// Layout of the TRST calculation template
    pub fn default_trst() -> Self {
        Self {
            sheet: "TRST".to_string(),
            input_cells: vec![
                (InputField::Premium, CellRef::new(3, 7)),             // C7
                (InputField::WithdrawalStartYear, CellRef::new(6, 7)), // F7
                (InputField::WithdrawalAmount, CellRef::new(6, 8)),    // F8
            ],
            year_cells: vec![
                (10, CellRef::new(7, 74)),  // G74
                (15, CellRef::new(7, 79)),  // G79
                (20, CellRef::new(7, 84)),  // G84
                (25, CellRef::new(7, 89)),  // G89
                (30, CellRef::new(7, 94)),  // G94
                (35, CellRef::new(7, 99)),  // G99
                (40, CellRef::new(7, 104)), // G104
                (45, CellRef::new(7, 109)), // G109
                (50, CellRef::new(7, 114)), // G114
                (55, CellRef::new(7, 119)), // G119
                (60, CellRef::new(7, 124)), // G124
                (70, CellRef::new(7, 134)), // G134
                (80, CellRef::new(7, 144)), // G144
                (90, CellRef::new(7, 154)), // G154
            ],
        }
    }

    /// Default layout with any overrides found in the default layout directory
    pub fn from_csv() -> Result<Self, IllustrationError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_LAYOUT_PATH))
    }

    /// Default layout with any overrides found in `dir`
    ///
    /// `input_cells.csv` and `year_cells.csv` are each optional; a missing
    /// file leaves the corresponding default table in place.
    pub fn from_csv_path(dir: &Path) -> Result<Self, IllustrationError> {
        let mut layout = Self::default_trst();

        let input_path = dir.join("input_cells.csv");
        if input_path.is_file() {
            layout.input_cells = loader::load_input_cells(&input_path)?;
        }
        let year_path = dir.join("year_cells.csv");
        if year_path.is_file() {
            layout.year_cells = loader::load_year_cells(&year_path)?;
        }
        Ok(layout)
    }

    pub fn input_cell(&self, field: InputField) -> Option<&CellRef> {
        self.input_cells.iter().find(|(f, _)| *f == field).map(|(_, c)| c)
    }

    pub fn year_cell(&self, year: u32) -> Option<&CellRef> {
        self.year_cells.iter().find(|(y, _)| *y == year).map(|(_, c)| c)
    }
}

impl Default for CalcLayout {
    fn default() -> Self {
        Self::default_trst()
    }
}

/// Cell layout of the report template
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Preferred sheet name; the first sheet is used if absent
    pub sheet: String,
    pub client_name_cell: CellRef,
    pub premium_cell: CellRef,
    pub total_premium_cell: CellRef,
    /// Row of the first report year in the results grid
    pub grid_base_row: u32,
    /// Result column per scenario (1-based)
    pub scenario_columns: Vec<(ScenarioKind, u32)>,
    /// Stacked description cells per withdrawal plan slot
    pub withdrawal_text_cells: Vec<(ScenarioKind, [CellRef; 2])>,
}

impl ReportLayout {
    /// Layout of the standard report template
    pub fn default_report() -> Self {
        Self {
            sheet: "Sheet1".to_string(),
            client_name_cell: CellRef::new(2, 1),   // B1
            premium_cell: CellRef::new(2, 5),       // B5
            total_premium_cell: CellRef::new(2, 6), // B6
            grid_base_row: 12,
            scenario_columns: vec![
                (ScenarioKind::NoWithdrawal, 2), // B
                (ScenarioKind::WithdrawalA, 4),  // D
                (ScenarioKind::WithdrawalB, 6),  // F
            ],
            withdrawal_text_cells: vec![
                (
                    ScenarioKind::WithdrawalA,
                    [CellRef::new(3, 9), CellRef::new(3, 10)], // C9, C10
                ),
                (
                    ScenarioKind::WithdrawalB,
                    [CellRef::new(5, 9), CellRef::new(5, 10)], // E9, E10
                ),
            ],
        }
    }

    pub fn scenario_column(&self, kind: ScenarioKind) -> Option<u32> {
        self.scenario_columns
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, col)| *col)
    }

    /// Grid cell for a scenario at the given index into the report-year list
    pub fn result_cell(&self, kind: ScenarioKind, year_index: usize) -> Option<CellRef> {
        self.scenario_column(kind)
            .map(|col| CellRef::new(col, self.grid_base_row + year_index as u32))
    }

    pub fn text_cells(&self, kind: ScenarioKind) -> Option<&[CellRef; 2]> {
        self.withdrawal_text_cells
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, cells)| cells)
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::default_report()
    }
}
