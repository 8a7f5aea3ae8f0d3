//! Error types for the illustration pipeline

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// One of the three headless conversions the pipeline performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStep {
    /// First recalculation hop
    XlsxToOds,
    /// Second recalculation hop
    OdsToXlsx,
    /// Report rasterization
    XlsxToPdf,
}

impl ConvertStep {
    /// Format string passed to `--convert-to`
    pub fn target_format(&self) -> &'static str {
        match self {
            ConvertStep::XlsxToOds => "ods",
            ConvertStep::OdsToXlsx => "xlsx",
            ConvertStep::XlsxToPdf => "pdf",
        }
    }
}

impl fmt::Display for ConvertStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConvertStep::XlsxToOds => "xlsx->ods",
            ConvertStep::OdsToXlsx => "ods->xlsx",
            ConvertStep::XlsxToPdf => "xlsx->pdf",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong between parameter entry and the final PDF
#[derive(Debug, Error)]
pub enum IllustrationError {
    /// A required template file does not exist
    #[error("template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    /// The workbook exists but the expected sheet does not
    #[error("sheet '{sheet}' not found in {}", .path.display())]
    SheetMissing { sheet: String, path: PathBuf },

    /// No usable soffice binary on this machine
    #[error("soffice binary not found; install LibreOffice or set ILLUSTRATION_SOFFICE")]
    SofficeNotFound,

    /// The binary exists but could not be started
    #[error("failed to launch {}: {source}", .binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The conversion subprocess exited with an error
    #[error("{step} conversion failed ({}): {stderr}", exit_code_label(.code))]
    ConversionFailed {
        step: ConvertStep,
        code: Option<i32>,
        stderr: String,
    },

    /// The subprocess reported success but its output never appeared
    #[error("{step} conversion produced no output at {}", .expected.display())]
    ConversionOutputMissing { step: ConvertStep, expected: PathBuf },

    /// The conversion subprocess was killed after exceeding its time limit
    #[error("{step} conversion timed out after {timeout_secs}s")]
    ConversionTimeout { step: ConvertStep, timeout_secs: u64 },

    /// A spreadsheet could not be read or written
    #[error("workbook error in {}: {detail}", .path.display())]
    Workbook { path: PathBuf, detail: String },

    /// PDF conversion output or the static document could not be assembled
    #[error("pdf assembly failed: {0}")]
    Pdf(String),

    /// A cell table or override file is malformed
    #[error("layout table error: {0}")]
    Layout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IllustrationError {
    /// Wrap a third-party workbook error together with its file path
    pub fn workbook(path: &Path, detail: impl fmt::Display) -> Self {
        IllustrationError::Workbook {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_failed_message() {
        let err = IllustrationError::ConversionFailed {
            step: ConvertStep::XlsxToOds,
            code: Some(77),
            stderr: "broken".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xlsx->ods"));
        assert!(msg.contains("exit code 77"));
        assert!(msg.contains("broken"));
    }

    #[test]
    fn test_signal_termination_message() {
        let err = IllustrationError::ConversionTimeout {
            step: ConvertStep::OdsToXlsx,
            timeout_secs: 60,
        };
        assert!(err.to_string().contains("60s"));

        let killed = IllustrationError::ConversionFailed {
            step: ConvertStep::XlsxToPdf,
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_target_formats() {
        assert_eq!(ConvertStep::XlsxToOds.target_format(), "ods");
        assert_eq!(ConvertStep::OdsToXlsx.target_format(), "xlsx");
        assert_eq!(ConvertStep::XlsxToPdf.target_format(), "pdf");
    }
}
