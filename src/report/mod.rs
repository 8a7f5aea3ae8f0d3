//! Report artifacts: populated workbook and merged PDF

pub mod excel;
pub mod pdf;

pub use excel::render_report;
pub use pdf::assemble_pdf;
