//! Plan parameters, scenarios, and projection results

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Policy years at which projected values are surfaced in the report
pub const REPORT_YEARS: [u32; 14] = [10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 70, 80, 90];

/// Fixed premium payment term in years
pub const PAYMENT_YEARS: u32 = 5;

/// Round a currency amount to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One withdrawal configuration; a zero start year disables it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    /// Policy year withdrawals begin (0 = disabled)
    #[serde(default)]
    pub start_year: u32,

    /// Annual withdrawal amount
    #[serde(default)]
    pub amount: f64,
}

impl WithdrawalPlan {
    pub fn new(start_year: u32, amount: f64) -> Self {
        Self { start_year, amount }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// A plan participates in calculation only when both fields are set
    pub fn is_active(&self) -> bool {
        self.start_year > 0 && self.amount > 0.0
    }

    /// Set on one side only; treated as disabled but worth a warning
    pub fn is_partial(&self) -> bool {
        !self.is_active() && (self.start_year > 0 || self.amount > 0.0)
    }
}

/// The three scenario slots computed per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    NoWithdrawal,
    WithdrawalA,
    WithdrawalB,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::NoWithdrawal,
        ScenarioKind::WithdrawalA,
        ScenarioKind::WithdrawalB,
    ];

    /// Human-readable label used in logs and status output
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::NoWithdrawal => "no withdrawal",
            ScenarioKind::WithdrawalA => "withdrawal A",
            ScenarioKind::WithdrawalB => "withdrawal B",
        }
    }

    /// Stable name safe for file paths
    pub fn file_name(&self) -> &'static str {
        match self {
            ScenarioKind::NoWithdrawal => "no_withdrawal",
            ScenarioKind::WithdrawalA => "withdrawal_a",
            ScenarioKind::WithdrawalB => "withdrawal_b",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values written to the calculation sheet for one scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioInputs {
    pub premium: f64,
    /// Zero when the scenario has no withdrawal
    pub withdrawal_start_year: u32,
    /// Zero when the scenario has no withdrawal
    pub withdrawal_amount: f64,
}

/// Shared inputs for one full calculation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanParameters {
    /// Client name printed on the report
    pub client_name: String,

    /// Annual premium
    pub premium: f64,

    /// Premium payment term in years
    #[serde(default = "default_payment_years")]
    pub payment_years: u32,

    /// Policy years surfaced in the report, in grid order
    #[serde(default = "default_report_years")]
    pub report_years: Vec<u32>,

    #[serde(default)]
    pub withdrawal_a: WithdrawalPlan,

    #[serde(default)]
    pub withdrawal_b: WithdrawalPlan,

    /// Date the projection was produced
    pub calculation_date: NaiveDate,
}

fn default_payment_years() -> u32 {
    PAYMENT_YEARS
}

fn default_report_years() -> Vec<u32> {
    REPORT_YEARS.to_vec()
}

impl PlanParameters {
    /// Parameters for a new run dated today, with no withdrawals
    pub fn new(client_name: impl Into<String>, premium: f64) -> Self {
        Self {
            client_name: client_name.into(),
            premium,
            payment_years: PAYMENT_YEARS,
            report_years: REPORT_YEARS.to_vec(),
            withdrawal_a: WithdrawalPlan::disabled(),
            withdrawal_b: WithdrawalPlan::disabled(),
            calculation_date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_withdrawal_a(mut self, start_year: u32, amount: f64) -> Self {
        self.withdrawal_a = WithdrawalPlan::new(start_year, amount);
        self
    }

    pub fn with_withdrawal_b(mut self, start_year: u32, amount: f64) -> Self {
        self.withdrawal_b = WithdrawalPlan::new(start_year, amount);
        self
    }

    /// Total premium paid over the full payment term
    pub fn total_premium(&self) -> f64 {
        self.premium * self.payment_years as f64
    }

    /// The withdrawal plan backing a scenario slot (none for no-withdrawal)
    pub fn withdrawal(&self, kind: ScenarioKind) -> Option<&WithdrawalPlan> {
        match kind {
            ScenarioKind::NoWithdrawal => None,
            ScenarioKind::WithdrawalA => Some(&self.withdrawal_a),
            ScenarioKind::WithdrawalB => Some(&self.withdrawal_b),
        }
    }

    /// Calculation-sheet inputs for one scenario; inactive plans write zeros
    pub fn scenario_inputs(&self, kind: ScenarioKind) -> ScenarioInputs {
        let (start, amount) = match self.withdrawal(kind) {
            Some(plan) if plan.is_active() => (plan.start_year, plan.amount),
            _ => (0, 0.0),
        };
        ScenarioInputs {
            premium: self.premium,
            withdrawal_start_year: start,
            withdrawal_amount: amount,
        }
    }

    /// Sanitized stem for artifact file names
    pub fn output_stem(&self) -> String {
        format!(
            "plan_{}_{}_{}y_{}",
            sanitize_component(&self.client_name),
            self.premium as i64,
            self.payment_years,
            self.calculation_date.format("%Y%m%d"),
        )
    }
}

fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        "client".to_string()
    } else {
        cleaned
    }
}

/// Projected value at one report year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedValue {
    pub year: u32,
    pub value: f64,
}

/// Ordered projected values for one scenario, one entry per report year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub rows: Vec<ProjectedValue>,
}

impl ProjectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, year: u32, value: f64) {
        self.rows.push(ProjectedValue { year, value });
    }

    /// Projected value at a given year, if that year was extracted
    pub fn value_for(&self, year: u32) -> Option<f64> {
        self.rows.iter().find(|r| r.year == year).map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the report renderer needs for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub parameters: PlanParameters,
    pub results: BTreeMap<ScenarioKind, ProjectionResult>,
}

impl ScenarioSet {
    pub fn new(parameters: PlanParameters) -> Self {
        Self {
            parameters,
            results: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, kind: ScenarioKind, result: ProjectionResult) {
        self.results.insert(kind, result);
    }

    pub fn result(&self, kind: ScenarioKind) -> Option<&ProjectionResult> {
        self.results.get(&kind)
    }

    pub fn contains(&self, kind: ScenarioKind) -> bool {
        self.results.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> PlanParameters {
        let mut params = PlanParameters::new("Test Client", 10_000.0);
        params.calculation_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        params
    }

    #[test]
    fn test_withdrawal_activity() {
        assert!(!WithdrawalPlan::disabled().is_active());
        assert!(WithdrawalPlan::new(10, 500.0).is_active());
        assert!(!WithdrawalPlan::new(10, 0.0).is_active());
        assert!(!WithdrawalPlan::new(0, 500.0).is_active());

        assert!(WithdrawalPlan::new(10, 0.0).is_partial());
        assert!(WithdrawalPlan::new(0, 500.0).is_partial());
        assert!(!WithdrawalPlan::new(10, 500.0).is_partial());
        assert!(!WithdrawalPlan::disabled().is_partial());
    }

    #[test]
    fn test_total_premium() {
        let params = test_params();
        assert_eq!(params.total_premium(), 50_000.0);

        let zero = PlanParameters::new("Z", 0.0);
        assert_eq!(zero.total_premium(), 0.0);
    }

    #[test]
    fn test_scenario_inputs_zero_out_inactive_plans() {
        let params = test_params().with_withdrawal_a(10, 500.0);

        let a = params.scenario_inputs(ScenarioKind::WithdrawalA);
        assert_eq!(a.withdrawal_start_year, 10);
        assert_eq!(a.withdrawal_amount, 500.0);

        let none = params.scenario_inputs(ScenarioKind::NoWithdrawal);
        assert_eq!(none.withdrawal_start_year, 0);
        assert_eq!(none.withdrawal_amount, 0.0);
        assert_eq!(none.premium, 10_000.0);

        // partially specified plan B writes zeros as well
        let partial = test_params().with_withdrawal_b(15, 0.0);
        let b = partial.scenario_inputs(ScenarioKind::WithdrawalB);
        assert_eq!(b.withdrawal_start_year, 0);
        assert_eq!(b.withdrawal_amount, 0.0);
    }

    #[test]
    fn test_output_stem_is_path_safe() {
        let mut params = test_params();
        params.client_name = "Ms. O'Brien / 陳大文".to_string();
        let stem = params.output_stem();
        assert!(!stem.contains(' '));
        assert!(!stem.contains('/'));
        assert!(!stem.contains('\''));
        assert!(stem.ends_with("_20240601"));

        params.client_name = "!!!".to_string();
        assert!(params.output_stem().starts_with("plan_client_"));
    }

    #[test]
    fn test_projection_result_lookup() {
        let mut result = ProjectionResult::new();
        result.push(10, 49_500.0);
        result.push(15, 47_000.0);

        assert_eq!(result.len(), 2);
        assert_eq!(result.value_for(10), Some(49_500.0));
        assert_eq!(result.value_for(99), None);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(100.456), 100.46);
        assert_eq!(round_cents(100.454), 100.45);
        assert_eq!(round_cents(0.0), 0.0);
    }

    #[test]
    fn test_scenario_set_serializes_with_stable_keys() {
        let mut set = ScenarioSet::new(test_params().with_withdrawal_a(10, 500.0));
        set.insert(ScenarioKind::NoWithdrawal, ProjectionResult::new());
        set.insert(ScenarioKind::WithdrawalA, ProjectionResult::new());

        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("no_withdrawal"));
        assert!(json.contains("withdrawal_a"));
        assert!(json.contains("2024-06-01"));

        let back: ScenarioSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn test_report_years_shape() {
        assert_eq!(REPORT_YEARS.len(), 14);
        assert_eq!(REPORT_YEARS[0], 10);
        assert_eq!(REPORT_YEARS[13], 90);
    }
}
