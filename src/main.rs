//! Illustration System CLI
//!
//! Runs the full calculation pipeline for one set of plan parameters and
//! writes the report artifacts into the output directory. `--offline`
//! swaps the external recalculation engine for the simplified model.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use illustration_system::layout::CalcLayout;
use illustration_system::plan::{PlanParameters, ScenarioKind, ScenarioSet, WithdrawalPlan};
use illustration_system::runner::{
    PlanRunner, RunReport, DEFAULT_CALC_TEMPLATE, DEFAULT_REPORT_TEMPLATE, DEFAULT_STATIC_PDF,
};

#[derive(Parser, Debug)]
#[command(
    name = "illustration_system",
    version,
    about = "Projects savings plan cash-surrender values and renders Excel/PDF reports"
)]
struct Args {
    /// Client name printed on the report
    #[arg(long, default_value = "Valued Client")]
    client: String,

    /// Annual premium
    #[arg(long, default_value_t = 10_000.0)]
    premium: f64,

    /// Policy year withdrawal plan A begins (0 = disabled)
    #[arg(long, default_value_t = 0)]
    withdrawal_a_start: u32,

    /// Annual withdrawal amount for plan A
    #[arg(long, default_value_t = 0.0)]
    withdrawal_a_amount: f64,

    /// Policy year withdrawal plan B begins (0 = disabled)
    #[arg(long, default_value_t = 0)]
    withdrawal_b_start: u32,

    /// Annual withdrawal amount for plan B
    #[arg(long, default_value_t = 0.0)]
    withdrawal_b_amount: f64,

    /// Calculation date stamped on the report (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Calculation template workbook
    #[arg(long, default_value = DEFAULT_CALC_TEMPLATE)]
    calc_template: PathBuf,

    /// Report template workbook
    #[arg(long, default_value = DEFAULT_REPORT_TEMPLATE)]
    report_template: PathBuf,

    /// Static appendix PDF appended after the generated page
    #[arg(long, default_value = DEFAULT_STATIC_PDF)]
    static_pdf: PathBuf,

    /// Directory receiving the report artifacts
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Directory with layout override CSVs (input_cells.csv, year_cells.csv)
    #[arg(long)]
    layout_dir: Option<PathBuf>,

    /// Explicit soffice binary, bypassing platform discovery
    #[arg(long)]
    soffice: Option<PathBuf>,

    /// Compute scenarios with the offline model; no external engine, no artifacts
    #[arg(long)]
    offline: bool,

    /// Print the scenario set as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let start = Instant::now();

    println!("Illustration System v{}", env!("CARGO_PKG_VERSION"));
    println!("=========================\n");

    let mut params = PlanParameters::new(&args.client, args.premium);
    params.withdrawal_a = WithdrawalPlan::new(args.withdrawal_a_start, args.withdrawal_a_amount);
    params.withdrawal_b = WithdrawalPlan::new(args.withdrawal_b_start, args.withdrawal_b_amount);
    if let Some(date) = args.date {
        params.calculation_date = date;
    }

    println!("Plan: {}", params.client_name);
    println!("  Annual premium: ${:.2}", params.premium);
    println!("  Payment term: {} years", params.payment_years);
    println!("  Total premium: ${:.2}", params.total_premium());
    println!("  Withdrawal A: {}", plan_summary(&params.withdrawal_a));
    println!("  Withdrawal B: {}", plan_summary(&params.withdrawal_b));
    println!("  Calculation date: {}", params.calculation_date);
    println!();

    let calc_layout = match &args.layout_dir {
        Some(dir) => CalcLayout::from_csv_path(dir)
            .with_context(|| format!("loading layout overrides from {}", dir.display()))?,
        None => CalcLayout::from_csv().context("loading default layout")?,
    };

    let mut runner = PlanRunner::new()
        .with_calc_template(&args.calc_template)
        .with_report_template(&args.report_template)
        .with_static_pdf(&args.static_pdf)
        .with_calc_layout(calc_layout);
    if let Some(path) = &args.soffice {
        runner = runner.with_soffice_path(path);
    }

    if args.offline {
        println!("Computing scenarios with the offline model (no recalculation engine)...\n");
        let set = runner.run_offline(&params);
        print_scenarios(&set, args.json)?;
        println!("\nTotal time: {:?}", start.elapsed());
        return Ok(ExitCode::SUCCESS);
    }

    println!("Running scenarios through the recalculation engine...");
    println!("This drives LibreOffice twice per scenario and can take a while.\n");
    let report = runner.run(&params).context("calculation run failed")?;

    for kind in ScenarioKind::ALL {
        if let Some(result) = report.scenarios.result(kind) {
            println!("  {}: {} projected values", kind, result.len());
        }
    }
    for (kind, e) in &report.scenario_errors {
        println!("  {}: FAILED - {}", kind, e);
    }
    println!();

    if !report.scenarios.is_empty() {
        print_scenarios(&report.scenarios, args.json)?;
        println!();
    }

    write_artifacts(&args.out_dir, &params, &report)?;

    println!("\nStatus: {}", report.status_line());
    if let Some(e) = &report.excel_error {
        println!("  Excel: {}", e);
    }
    if let Some(e) = &report.pdf_error {
        println!("  PDF: {}", e);
    }
    println!("Total time: {:?}", start.elapsed());

    if report.fully_successful() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn plan_summary(plan: &WithdrawalPlan) -> String {
    if plan.is_active() {
        format!("${:.2}/year from policy year {}", plan.amount, plan.start_year)
    } else if plan.is_partial() {
        format!(
            "partially specified (start year {}, amount {:.2}) - treated as disabled",
            plan.start_year, plan.amount
        )
    } else {
        "not configured".to_string()
    }
}

/// Print the scenario set as an aligned table, or as JSON with `--json`
fn print_scenarios(set: &ScenarioSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(set)?);
        return Ok(());
    }

    let kinds: Vec<ScenarioKind> = set.results.keys().copied().collect();
    let mut header = format!("{:>6}", "Year");
    for kind in &kinds {
        header.push_str(&format!(" {:>16}", kind.label()));
    }
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for &year in &set.parameters.report_years {
        let mut line = format!("{:>6}", year);
        for kind in &kinds {
            match set.result(*kind).and_then(|r| r.value_for(year)) {
                Some(value) => line.push_str(&format!(" {:>16.2}", value)),
                None => line.push_str(&format!(" {:>16}", "--")),
            }
        }
        println!("{}", line);
    }
    Ok(())
}

fn write_artifacts(out_dir: &Path, params: &PlanParameters, report: &RunReport) -> Result<()> {
    if report.excel.is_none() && report.pdf.is_none() {
        return Ok(());
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let stem = params.output_stem();
    if let Some(bytes) = &report.excel {
        let path = out_dir.join(format!("{}.xlsx", stem));
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("Excel report written to {}", path.display());
    }
    if let Some(bytes) = &report.pdf {
        let path = out_dir.join(format!("{}.pdf", stem));
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("PDF report written to {}", path.display());
    }
    Ok(())
}
