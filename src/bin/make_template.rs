//! Writes sample calculation and report templates into the data directory
//!
//! The real TRST calculation workbook is proprietary; this tool builds a
//! stand-in with the same input cells and result layout, carrying a yearly
//! balance cascade that matches the offline model, so the full pipeline
//! (including the recalculation hops) can be exercised without the
//! real workbooks.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use illustration_system::plan::{PAYMENT_YEARS, REPORT_YEARS};

/// Year y lives on row 64 + y, so G74 holds year 10 and G154 holds
/// year 90, matching the default year->cell table
const YEAR_ROW_OFFSET: u32 = 64;
const LAST_YEAR: u32 = 90;

#[derive(Parser, Debug)]
#[command(about = "Generate sample calculation and report templates")]
struct Args {
    /// Directory receiving the generated templates
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Overwrite templates that already exist
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let calc_path = args.out_dir.join("calculation_template.xlsx");
    let report_path = args.out_dir.join("report_template.xlsx");
    for path in [&calc_path, &report_path] {
        if path.exists() && !args.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
    }

    write_calculation_template(&calc_path)?;
    println!("Calculation template written to {}", calc_path.display());

    write_report_template(&report_path)?;
    println!("Report template written to {}", report_path.display());

    Ok(())
}

/// Sample TRST workbook: input cells C7/F7/F8 plus a formula cascade
/// reproducing the offline model (premium paid over the fixed term,
/// all-or-nothing withdrawal from its start year, floored at zero)
fn write_calculation_template(path: &Path) -> Result<()> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("new workbook has a sheet");
    sheet.set_name("TRST");

    sheet
        .get_cell_mut("A1")
        .set_value("TRST savings plan calculator (sample)");
    sheet.get_cell_mut("B7").set_value("Annual premium");
    sheet.get_cell_mut("C7").set_value_number(0.0);
    sheet.get_cell_mut("E7").set_value("Withdrawal start year");
    sheet.get_cell_mut("F7").set_value_number(0.0);
    sheet.get_cell_mut("E8").set_value("Annual withdrawal");
    sheet.get_cell_mut("F8").set_value_number(0.0);

    sheet.get_cell_mut("E63").set_value("After deposit");
    sheet.get_cell_mut("F63").set_value("Year");
    sheet.get_cell_mut("G63").set_value("Balance");
    // seed balance so the year-1 formula can reference the row above
    sheet.get_cell_mut("G64").set_value_number(0.0);

    for year in 1..=LAST_YEAR {
        let row = YEAR_ROW_OFFSET + year;
        let year_cell = format!("F{}", row);
        let deposit_cell = format!("E{}", row);
        let balance_cell = format!("G{}", row);

        sheet
            .get_cell_mut(year_cell.as_str())
            .set_value_number(year as f64);
        sheet.get_cell_mut(deposit_cell.as_str()).set_formula(format!(
            "=G{}+IF(F{}<={},$C$7,0)",
            row - 1,
            row,
            PAYMENT_YEARS
        ));
        sheet.get_cell_mut(balance_cell.as_str()).set_formula(format!(
            "=MAX(0,E{row}-IF(AND($F$7>0,$F$8>0,F{row}>=$F$7,E{row}>=$F$8),$F$8,0))",
            row = row
        ));
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Sample report workbook: header labels, withdrawal-plan area, and the
/// results grid with year labels down column A
fn write_report_template(path: &Path) -> Result<()> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("new workbook has a sheet");

    sheet.get_cell_mut("A1").set_value("Client");
    sheet.get_cell_mut("A2").set_value("Product");
    sheet.get_cell_mut("B2").set_value("TRST Savings Plan");
    sheet.get_cell_mut("A3").set_value("Currency");
    sheet.get_cell_mut("B3").set_value("USD");
    sheet.get_cell_mut("A4").set_value("Payment term");
    sheet
        .get_cell_mut("B4")
        .set_value(format!("{} years", PAYMENT_YEARS));
    sheet.get_cell_mut("A5").set_value("Annual premium");
    sheet.get_cell_mut("A6").set_value("Total premium");

    sheet.get_cell_mut("A8").set_value("Withdrawal plans");
    sheet.get_cell_mut("C8").set_value("Plan A");
    sheet.get_cell_mut("E8").set_value("Plan B");

    sheet.get_cell_mut("A11").set_value("Policy year");
    sheet.get_cell_mut("B11").set_value("No withdrawal");
    sheet.get_cell_mut("D11").set_value("Plan A");
    sheet.get_cell_mut("F11").set_value("Plan B");
    for (i, year) in REPORT_YEARS.iter().enumerate() {
        let coord = format!("A{}", 12 + i);
        sheet
            .get_cell_mut(coord.as_str())
            .set_value_number(*year as f64);
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
