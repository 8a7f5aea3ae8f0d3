//! Offline projection model
//!
//! A pure-arithmetic stand-in for the spreadsheet engine: 0% interest,
//! premium paid in over the payment term, the withdrawal taken from its
//! start year onward whenever the balance covers the full amount. Used by
//! the CLI's offline mode and as the reference model for the sample
//! calculation template.

use super::{
    build_scenarios, round_cents, PlanParameters, ProjectionResult, ScenarioInputs, ScenarioSet,
};

/// Project one scenario across the report years
pub fn project(inputs: &ScenarioInputs, payment_years: u32, report_years: &[u32]) -> ProjectionResult {
    let horizon = report_years.iter().copied().max().unwrap_or(0);
    let withdrawing = inputs.withdrawal_start_year > 0 && inputs.withdrawal_amount > 0.0;

    let mut balance = 0.0_f64;
    let mut result = ProjectionResult::new();
    let mut by_year = vec![0.0_f64; horizon as usize + 1];

    for year in 1..=horizon {
        if year <= payment_years {
            balance += inputs.premium;
        }
        // withdrawals are all-or-nothing: skipped when the balance is short
        if withdrawing && year >= inputs.withdrawal_start_year && balance >= inputs.withdrawal_amount
        {
            balance -= inputs.withdrawal_amount;
        }
        if balance < 0.0 {
            balance = 0.0;
        }
        by_year[year as usize] = balance;
    }

    for &year in report_years {
        let value = by_year.get(year as usize).copied().unwrap_or(0.0);
        result.push(year, round_cents(value));
    }
    result
}

/// Compute every active scenario with the offline model
pub fn project_scenarios(params: &PlanParameters) -> ScenarioSet {
    let mut set = ScenarioSet::new(params.clone());
    for kind in build_scenarios(params) {
        let inputs = params.scenario_inputs(kind);
        set.insert(kind, project(&inputs, params.payment_years, &params.report_years));
    }
    set
}
