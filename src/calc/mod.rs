//! Calculation pipeline: input writing, external recalculation, extraction

pub mod extract;
pub mod soffice;
pub mod workspace;
pub mod writer;

pub use extract::extract_results;
pub use soffice::{Soffice, SOFFICE_ENV};
pub use workspace::Workspace;
pub use writer::{write_scenario_input, CellValue};
