//! Per-run temporary workspace

use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::error::IllustrationError;
use crate::plan::ScenarioKind;

/// Scratch directory owned by exactly one calculation run
///
/// Holds the per-scenario template copies and conversion intermediates.
/// Removed when the run ends; removal failure is a warning, never an error.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh, uniquely named workspace
    pub fn create() -> Result<Self, IllustrationError> {
        let dir = tempfile::Builder::new()
            .prefix("illustration_run_")
            .tempdir()?;
        debug!("created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Scenario input workbook (template copy with inputs written)
    pub fn input_path(&self, kind: ScenarioKind) -> PathBuf {
        self.dir.path().join(format!("input_{}.xlsx", kind.file_name()))
    }

    /// First-hop output parked between the two conversions
    pub fn intermediate_path(&self, kind: ScenarioKind) -> PathBuf {
        self.dir
            .path()
            .join(format!("intermediate_{}.ods", kind.file_name()))
    }

    /// Fully recalculated scenario workbook
    pub fn calculated_path(&self, kind: ScenarioKind) -> PathBuf {
        self.dir
            .path()
            .join(format!("calculated_{}.xlsx", kind.file_name()))
    }

    /// Remove the workspace now instead of waiting for drop
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("could not remove workspace {}: {}", path.display(), e);
        } else {
            debug!("removed workspace {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_paths_are_distinct() {
        let ws = Workspace::create().unwrap();

        let input = ws.input_path(ScenarioKind::WithdrawalA);
        assert!(input.starts_with(ws.path()));
        assert!(input.to_string_lossy().ends_with("input_withdrawal_a.xlsx"));

        let inter = ws.intermediate_path(ScenarioKind::WithdrawalA);
        assert!(inter.to_string_lossy().ends_with("intermediate_withdrawal_a.ods"));

        let calc = ws.calculated_path(ScenarioKind::NoWithdrawal);
        assert!(calc.to_string_lossy().ends_with("calculated_no_withdrawal.xlsx"));
    }

    #[test]
    fn test_close_removes_directory() {
        let ws = Workspace::create().unwrap();
        let path = ws.path().to_path_buf();
        std::fs::write(path.join("scratch.txt"), b"x").unwrap();

        ws.close();
        assert!(!path.exists());
    }
}
