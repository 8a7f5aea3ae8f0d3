//! Illustration System - Spreadsheet-driven savings plan projections with withdrawal scenarios
//!
//! This library provides:
//! - Scenario generation from premium and withdrawal parameters
//! - Template-preserving input writing into the calculation workbook
//! - Headless LibreOffice orchestration to force formula recalculation
//! - Projected-value extraction via injected cell lookup tables
//! - Excel and merged-PDF report rendering as in-memory byte buffers

pub mod calc;
pub mod error;
pub mod layout;
pub mod plan;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use error::{ConvertStep, IllustrationError};
pub use layout::{CalcLayout, CellRef, ReportLayout};
pub use plan::{PlanParameters, ProjectionResult, ScenarioKind, ScenarioSet, WithdrawalPlan};
pub use runner::{PlanRunner, RunReport};
