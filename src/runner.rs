//! End-to-end orchestration of one illustration run
//!
//! One run = locate the binary, create a workspace, drive every scenario
//! through write -> recalculate -> extract sequentially, then attempt the
//! Excel and PDF artifacts independently. Partial success is first-class:
//! the RunReport says exactly which scenarios and artifacts made it.

use std::path::PathBuf;

use log::{error, info, warn};

use crate::calc::{extract_results, write_scenario_input, Soffice, Workspace};
use crate::error::IllustrationError;
use crate::layout::{CalcLayout, ReportLayout};
use crate::plan::{
    build_scenarios, simplified, PlanParameters, ProjectionResult, ScenarioKind, ScenarioSet,
};
use crate::report::{assemble_pdf, render_report};

/// Default calculation template location
pub const DEFAULT_CALC_TEMPLATE: &str = "data/calculation_template.xlsx";
/// Default report template location
pub const DEFAULT_REPORT_TEMPLATE: &str = "data/report_template.xlsx";
/// Default static appendix document
pub const DEFAULT_STATIC_PDF: &str = "data/static_appendix.pdf";

/// Drives the full pipeline for one set of plan parameters
#[derive(Debug, Clone)]
pub struct PlanRunner {
    calc_template: PathBuf,
    report_template: PathBuf,
    static_pdf: PathBuf,
    calc_layout: CalcLayout,
    report_layout: ReportLayout,
    soffice_path: Option<PathBuf>,
}

impl PlanRunner {
    /// Runner with default template paths and layouts
    pub fn new() -> Self {
        Self {
            calc_template: PathBuf::from(DEFAULT_CALC_TEMPLATE),
            report_template: PathBuf::from(DEFAULT_REPORT_TEMPLATE),
            static_pdf: PathBuf::from(DEFAULT_STATIC_PDF),
            calc_layout: CalcLayout::default_trst(),
            report_layout: ReportLayout::default_report(),
            soffice_path: None,
        }
    }

    pub fn with_calc_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.calc_template = path.into();
        self
    }

    pub fn with_report_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_template = path.into();
        self
    }

    pub fn with_static_pdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_pdf = path.into();
        self
    }

    pub fn with_calc_layout(mut self, layout: CalcLayout) -> Self {
        self.calc_layout = layout;
        self
    }

    pub fn with_report_layout(mut self, layout: ReportLayout) -> Self {
        self.report_layout = layout;
        self
    }

    /// Use an explicit soffice binary instead of platform discovery
    pub fn with_soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.soffice_path = Some(path.into());
        self
    }

    /// Run every scenario through the external engine and render both artifacts
    ///
    /// Returns `Err` only when nothing could start at all (binary not found,
    /// workspace creation failed); every later failure lands in the report.
    pub fn run(&self, params: &PlanParameters) -> Result<RunReport, IllustrationError> {
        let soffice = match &self.soffice_path {
            Some(path) => Soffice::at(path)?,
            None => Soffice::locate()?,
        };
        let workspace = Workspace::create()?;

        let mut set = ScenarioSet::new(params.clone());
        let mut scenario_errors = Vec::new();
        for kind in build_scenarios(params) {
            info!("[{}] starting scenario", kind);
            match self.run_scenario(&soffice, &workspace, params, kind) {
                Ok(result) => {
                    info!("[{}] extracted {} values", kind, result.len());
                    set.insert(kind, result);
                }
                Err(e) => {
                    error!("[{}] scenario failed: {}", kind, e);
                    scenario_errors.push((kind, e));
                }
            }
        }

        let mut report = RunReport::new(set);
        report.scenario_errors = scenario_errors;

        if report.scenarios.is_empty() {
            warn!("no scenario produced results; skipping report artifacts");
        } else {
            match render_report(&self.report_template, &self.report_layout, &report.scenarios) {
                Ok(bytes) => {
                    info!("report workbook rendered ({} bytes)", bytes.len());
                    report.excel = Some(bytes);
                }
                Err(e) => {
                    error!("report workbook failed: {}", e);
                    report.excel_error = Some(e);
                }
            }

            // the PDF attempt re-renders if the workbook attempt failed,
            // so one broken artifact cannot take the other down
            let page = match report.excel.as_deref() {
                Some(bytes) => Ok(bytes.to_vec()),
                None => render_report(&self.report_template, &self.report_layout, &report.scenarios),
            };
            match page.and_then(|bytes| assemble_pdf(&soffice, &bytes, &self.static_pdf)) {
                Ok(bytes) => {
                    info!("merged document assembled ({} bytes)", bytes.len());
                    report.pdf = Some(bytes);
                }
                Err(e) => {
                    error!("merged document failed: {}", e);
                    report.pdf_error = Some(e);
                }
            }
        }

        workspace.close();
        Ok(report)
    }

    fn run_scenario(
        &self,
        soffice: &Soffice,
        workspace: &Workspace,
        params: &PlanParameters,
        kind: ScenarioKind,
    ) -> Result<ProjectionResult, IllustrationError> {
        let inputs = params.scenario_inputs(kind);
        let input_path = workspace.input_path(kind);
        write_scenario_input(&self.calc_template, &input_path, &self.calc_layout, &inputs)?;

        soffice.recalculate(
            &input_path,
            &workspace.intermediate_path(kind),
            &workspace.calculated_path(kind),
        )?;

        extract_results(
            &workspace.calculated_path(kind),
            &self.calc_layout,
            &params.report_years,
        )
    }

    /// Compute every scenario with the offline model; no external engine
    pub fn run_offline(&self, params: &PlanParameters) -> ScenarioSet {
        simplified::project_scenarios(params)
    }
}

impl Default for PlanRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one run: per-scenario results and both artifacts
#[derive(Debug)]
pub struct RunReport {
    /// Scenarios that completed, with their projections
    pub scenarios: ScenarioSet,
    /// Scenarios that failed, in execution order
    pub scenario_errors: Vec<(ScenarioKind, IllustrationError)>,
    /// Rendered report workbook
    pub excel: Option<Vec<u8>>,
    pub excel_error: Option<IllustrationError>,
    /// Merged output document
    pub pdf: Option<Vec<u8>>,
    pub pdf_error: Option<IllustrationError>,
}

impl RunReport {
    fn new(scenarios: ScenarioSet) -> Self {
        Self {
            scenarios,
            scenario_errors: Vec::new(),
            excel: None,
            excel_error: None,
            pdf: None,
            pdf_error: None,
        }
    }

    /// True when every scenario and both artifacts succeeded
    pub fn fully_successful(&self) -> bool {
        self.scenario_errors.is_empty() && self.excel.is_some() && self.pdf.is_some()
    }

    /// One-line status naming which artifacts are available
    pub fn status_line(&self) -> &'static str {
        match (self.excel.is_some(), self.pdf.is_some()) {
            (true, true) => "Excel and PDF reports are ready",
            (true, false) => "Excel report is ready; the PDF could not be generated",
            (false, true) => "PDF report is ready; the Excel workbook could not be generated",
            (false, false) => "no report artifact could be generated",
        }
    }
}
