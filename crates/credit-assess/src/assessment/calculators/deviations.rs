use serde::{Deserialize, Serialize};

use super::cash_flow::{CASH_FLOW_STABILITY_SCORE, TOTAL_ANNUAL_CREDITS};
use super::loan::{
    DEBT_BURDEN_RATIO, DEBT_SERVICE_COVERAGE_RATIO, LOAN_TO_VALUE, TOTAL_MONTHLY_OBLIGATIONS,
};
use super::ratios::CURRENT_RATIO;
use crate::assessment::domain::{DerivedValue, OutputFormat, RawInputs};
use crate::assessment::registry::{Calculator, ResolvedDependencies};

pub const POLICY_DEVIATIONS: &str = "policy_deviations";
pub const NO_DEVIATION: &str = "No deviation";

/// Credit policy limits checked when flagging deviations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyThresholds {
    /// Ceiling on instalments as a percentage of monthly income.
    pub max_debt_burden_ratio: f64,
    /// Ceiling on loan amount as a percentage of collateral value.
    pub max_loan_to_value: f64,
    pub min_debt_service_coverage: f64,
    pub min_current_ratio: f64,
    pub min_cash_flow_stability: f64,
    pub max_age_at_maturity: f64,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            max_debt_burden_ratio: 50.0,
            max_loan_to_value: 80.0,
            min_debt_service_coverage: 1.25,
            min_current_ratio: 1.0,
            min_cash_flow_stability: 40.0,
            max_age_at_maturity: 65.0,
        }
    }
}

/// Short code attached to an application that breaches a policy limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationCode {
    HighDebtBurden,
    InsufficientCollateral,
    LowDebtServiceCoverage,
    WeakLiquidity,
    UnstableCashFlow,
    AgeAtMaturity,
}

impl DeviationCode {
    pub const fn label(self) -> &'static str {
        match self {
            DeviationCode::HighDebtBurden => "High DBR",
            DeviationCode::InsufficientCollateral => "Insufficient collateral",
            DeviationCode::LowDebtServiceCoverage => "Low DSCR",
            DeviationCode::WeakLiquidity => "Weak liquidity",
            DeviationCode::UnstableCashFlow => "Unstable cash flow",
            DeviationCode::AgeAtMaturity => "Age at maturity",
        }
    }
}

/// Ordered deviation codes for one application.
pub fn detect_deviations(
    inputs: &RawInputs,
    resolved: &ResolvedDependencies<'_>,
    policy: &PolicyThresholds,
) -> Vec<DeviationCode> {
    let mut codes = Vec::new();

    if resolved.number(DEBT_BURDEN_RATIO) > policy.max_debt_burden_ratio {
        codes.push(DeviationCode::HighDebtBurden);
    }

    if resolved.number(LOAN_TO_VALUE) > policy.max_loan_to_value {
        codes.push(DeviationCode::InsufficientCollateral);
    }

    if resolved.number(TOTAL_MONTHLY_OBLIGATIONS) > 0.0
        && resolved.number(DEBT_SERVICE_COVERAGE_RATIO) < policy.min_debt_service_coverage
    {
        codes.push(DeviationCode::LowDebtServiceCoverage);
    }

    if inputs.is_present("current_liabilities")
        && resolved.number(CURRENT_RATIO) < policy.min_current_ratio
    {
        codes.push(DeviationCode::WeakLiquidity);
    }

    if resolved.number(TOTAL_ANNUAL_CREDITS) > 0.0
        && resolved.number(CASH_FLOW_STABILITY_SCORE) < policy.min_cash_flow_stability
    {
        codes.push(DeviationCode::UnstableCashFlow);
    }

    if inputs.is_present("applicant_age") {
        let age_at_maturity =
            inputs.number("applicant_age") + inputs.number("tenure_months") / 12.0;
        if age_at_maturity > policy.max_age_at_maturity {
            codes.push(DeviationCode::AgeAtMaturity);
        }
    }

    codes
}

/// Display string of every breached policy, or [`NO_DEVIATION`].
pub struct PolicyDeviations {
    policy: PolicyThresholds,
}

impl PolicyDeviations {
    pub fn new(policy: PolicyThresholds) -> Self {
        Self { policy }
    }
}

impl Calculator for PolicyDeviations {
    fn name(&self) -> &str {
        POLICY_DEVIATIONS
    }

    fn dependencies(&self) -> &[&str] {
        &[
            DEBT_BURDEN_RATIO,
            LOAN_TO_VALUE,
            DEBT_SERVICE_COVERAGE_RATIO,
            TOTAL_MONTHLY_OBLIGATIONS,
            CURRENT_RATIO,
            CASH_FLOW_STABILITY_SCORE,
            TOTAL_ANNUAL_CREDITS,
        ]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn evaluate(&self, inputs: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        let codes = detect_deviations(inputs, resolved, &self.policy);
        if codes.is_empty() {
            return DerivedValue::Text(NO_DEVIATION.to_string());
        }

        DerivedValue::Text(
            codes
                .iter()
                .map(|code| code.label())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(values: &[(&'static str, f64)], inputs: &RawInputs) -> Vec<DeviationCode> {
        let owned: Vec<(&str, DerivedValue)> = values
            .iter()
            .map(|(name, value)| (*name, DerivedValue::Number(*value)))
            .collect();
        let resolved =
            ResolvedDependencies::new(owned.iter().map(|(name, value)| (*name, value)).collect());
        detect_deviations(inputs, &resolved, &PolicyThresholds::default())
    }

    #[test]
    fn debt_burden_at_the_limit_is_not_flagged() {
        assert!(detect(&[(DEBT_BURDEN_RATIO, 50.0)], &RawInputs::new()).is_empty());
        assert_eq!(
            detect(&[(DEBT_BURDEN_RATIO, 50.01)], &RawInputs::new()),
            vec![DeviationCode::HighDebtBurden]
        );
    }

    #[test]
    fn coverage_at_the_minimum_is_not_flagged() {
        let at_minimum = [
            (TOTAL_MONTHLY_OBLIGATIONS, 20_000.0),
            (DEBT_SERVICE_COVERAGE_RATIO, 1.25),
        ];
        let below_minimum = [
            (TOTAL_MONTHLY_OBLIGATIONS, 20_000.0),
            (DEBT_SERVICE_COVERAGE_RATIO, 1.24),
        ];

        assert!(detect(&at_minimum, &RawInputs::new()).is_empty());
        assert_eq!(
            detect(&below_minimum, &RawInputs::new()),
            vec![DeviationCode::LowDebtServiceCoverage]
        );
    }

    #[test]
    fn coverage_is_ignored_without_obligations() {
        assert!(detect(&[(DEBT_SERVICE_COVERAGE_RATIO, 0.0)], &RawInputs::new()).is_empty());
    }

    #[test]
    fn loan_to_value_at_the_limit_is_not_flagged() {
        assert!(detect(&[(LOAN_TO_VALUE, 80.0)], &RawInputs::new()).is_empty());
        assert_eq!(
            detect(&[(LOAN_TO_VALUE, 80.5)], &RawInputs::new()),
            vec![DeviationCode::InsufficientCollateral]
        );
    }

    #[test]
    fn age_at_maturity_uses_tenure_in_years() {
        let at_limit = RawInputs::new()
            .with("applicant_age", 55.0)
            .with("tenure_months", 120.0);
        let past_limit = RawInputs::new()
            .with("applicant_age", 55.0)
            .with("tenure_months", 132.0);

        assert!(detect(&[], &at_limit).is_empty());
        assert_eq!(detect(&[], &past_limit), vec![DeviationCode::AgeAtMaturity]);
    }
}
