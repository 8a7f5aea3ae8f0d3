//! Plan parameters and scenario generation

mod data;
pub mod simplified;

pub use data::{
    round_cents, PlanParameters, ProjectedValue, ProjectionResult, ScenarioInputs, ScenarioKind,
    ScenarioSet, WithdrawalPlan, PAYMENT_YEARS, REPORT_YEARS,
};

use log::warn;

/// Scenario list for one run: no-withdrawal always, A and B when active
///
/// A partially specified plan (start year without amount, or the reverse)
/// is excluded from calculation, with a warning.
pub fn build_scenarios(params: &PlanParameters) -> Vec<ScenarioKind> {
    let mut kinds = vec![ScenarioKind::NoWithdrawal];
    for kind in [ScenarioKind::WithdrawalA, ScenarioKind::WithdrawalB] {
        if let Some(plan) = params.withdrawal(kind) {
            if plan.is_active() {
                kinds.push(kind);
            } else if plan.is_partial() {
                warn!(
                    "{} is partially specified (start year {}, amount {}); treating as disabled",
                    kind, plan.start_year, plan.amount
                );
            }
        }
    }
    kinds
}
