//! Bank-statement cash-flow metrics.
//!
//! Statement entries arrive as `bank{account}_credit_{month}` and `bank{account}_debit_{month}`.

use crate::assessment::domain::{DerivedValue, OutputFormat, RawInputs};
use crate::assessment::numeric::{mean, population_std_dev, round_to, safe_div};
use crate::assessment::registry::{Calculator, ResolvedDependencies};

pub const BANK_ACCOUNTS: usize = 3;
pub const STATEMENT_MONTHS: usize = 12;

pub const MONTHLY_CREDIT_SERIES: &str = "monthly_credit_series";
pub const MONTHLY_DEBIT_SERIES: &str = "monthly_debit_series";
pub const TOTAL_ANNUAL_CREDITS: &str = "total_annual_credits";
pub const TOTAL_ANNUAL_DEBITS: &str = "total_annual_debits";
pub const AVERAGE_MONTHLY_CREDITS: &str = "average_monthly_credits";
pub const AVERAGE_MONTHLY_DEBITS: &str = "average_monthly_debits";
pub const NET_MONTHLY_SURPLUS: &str = "net_monthly_surplus";
pub const CREDIT_VOLATILITY_INDEX: &str = "credit_volatility_index";
pub const CREDIT_TREND: &str = "credit_trend";
pub const CREDIT_CONCENTRATION: &str = "credit_concentration";
pub const CASH_FLOW_STABILITY_SCORE: &str = "cash_flow_stability_score";

const MAX_VOLATILITY_PENALTY: f64 = 40.0;
const MAX_TREND_PENALTY: f64 = 30.0;
const MAX_CONCENTRATION_PENALTY: f64 = 30.0;
const CONCENTRATION_TOLERANCE: f64 = 50.0;

/// Credit or debit side of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Credit,
    Debit,
}

impl Flow {
    const fn label(self) -> &'static str {
        match self {
            Flow::Credit => "credit",
            Flow::Debit => "debit",
        }
    }
}

pub fn statement_key(account: usize, flow: Flow, month: usize) -> String {
    format!("bank{account}_{}_{month}", flow.label())
}

fn account_month(inputs: &RawInputs, account: usize, flow: Flow, month: usize) -> f64 {
    inputs.number(&statement_key(account, flow, month))
}

fn account_total(inputs: &RawInputs, account: usize, flow: Flow) -> f64 {
    (1..=STATEMENT_MONTHS)
        .map(|month| account_month(inputs, account, flow, month))
        .sum()
}

/// Per-month totals across all accounts.
pub struct MonthlySeries {
    flow: Flow,
}

impl MonthlySeries {
    pub const fn credits() -> Self {
        Self { flow: Flow::Credit }
    }

    pub const fn debits() -> Self {
        Self { flow: Flow::Debit }
    }
}

impl Calculator for MonthlySeries {
    fn name(&self) -> &str {
        match self.flow {
            Flow::Credit => MONTHLY_CREDIT_SERIES,
            Flow::Debit => MONTHLY_DEBIT_SERIES,
        }
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Raw
    }

    fn evaluate(&self, inputs: &RawInputs, _: &ResolvedDependencies<'_>) -> DerivedValue {
        let series: Vec<f64> = (1..=STATEMENT_MONTHS)
            .map(|month| {
                (1..=BANK_ACCOUNTS)
                    .map(|account| account_month(inputs, account, self.flow, month))
                    .sum()
            })
            .collect();
        DerivedValue::Series(series)
    }
}

pub struct AnnualTotal {
    flow: Flow,
}

impl AnnualTotal {
    pub const fn credits() -> Self {
        Self { flow: Flow::Credit }
    }

    pub const fn debits() -> Self {
        Self { flow: Flow::Debit }
    }
}

impl Calculator for AnnualTotal {
    fn name(&self) -> &str {
        match self.flow {
            Flow::Credit => TOTAL_ANNUAL_CREDITS,
            Flow::Debit => TOTAL_ANNUAL_DEBITS,
        }
    }

    fn dependencies(&self) -> &[&str] {
        match self.flow {
            Flow::Credit => &[MONTHLY_CREDIT_SERIES],
            Flow::Debit => &[MONTHLY_DEBIT_SERIES],
        }
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        let series = resolved.series(self.dependencies()[0]);
        DerivedValue::Number(series.iter().sum())
    }
}

/// Annual total spread over the statement window.
pub struct MonthlyAverage {
    flow: Flow,
}

impl MonthlyAverage {
    pub const fn credits() -> Self {
        Self { flow: Flow::Credit }
    }

    pub const fn debits() -> Self {
        Self { flow: Flow::Debit }
    }
}

impl Calculator for MonthlyAverage {
    fn name(&self) -> &str {
        match self.flow {
            Flow::Credit => AVERAGE_MONTHLY_CREDITS,
            Flow::Debit => AVERAGE_MONTHLY_DEBITS,
        }
    }

    fn dependencies(&self) -> &[&str] {
        match self.flow {
            Flow::Credit => &[TOTAL_ANNUAL_CREDITS],
            Flow::Debit => &[TOTAL_ANNUAL_DEBITS],
        }
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        let total = resolved.number(self.dependencies()[0]);
        DerivedValue::Number(safe_div(total, STATEMENT_MONTHS as f64))
    }
}

pub struct NetMonthlySurplus;

impl Calculator for NetMonthlySurplus {
    fn name(&self) -> &str {
        NET_MONTHLY_SURPLUS
    }

    fn dependencies(&self) -> &[&str] {
        &[AVERAGE_MONTHLY_CREDITS, AVERAGE_MONTHLY_DEBITS]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Currency
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(
            resolved.number(AVERAGE_MONTHLY_CREDITS) - resolved.number(AVERAGE_MONTHLY_DEBITS),
        )
    }
}

/// Coefficient of variation of positive monthly credits, as a percentage.
pub struct CreditVolatilityIndex;

pub fn volatility_index(series: &[f64]) -> f64 {
    let positive: Vec<f64> = series.iter().copied().filter(|value| *value > 0.0).collect();
    if positive.is_empty() {
        return 0.0;
    }
    safe_div(population_std_dev(&positive), mean(&positive)) * 100.0
}

impl Calculator for CreditVolatilityIndex {
    fn name(&self) -> &str {
        CREDIT_VOLATILITY_INDEX
    }

    fn dependencies(&self) -> &[&str] {
        &[MONTHLY_CREDIT_SERIES]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(volatility_index(resolved.series(MONTHLY_CREDIT_SERIES)))
    }
}

/// Change between the first-half and second-half average of the series, as a percentage.
pub struct CreditTrend;

pub fn half_over_half_change(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let (early, late) = series.split_at(series.len() / 2);
    let early_mean = mean(early);
    safe_div(mean(late) - early_mean, early_mean) * 100.0
}

impl Calculator for CreditTrend {
    fn name(&self) -> &str {
        CREDIT_TREND
    }

    fn dependencies(&self) -> &[&str] {
        &[MONTHLY_CREDIT_SERIES]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(half_over_half_change(resolved.series(MONTHLY_CREDIT_SERIES)))
    }
}

/// Largest share of annual credits flowing through a single account.
pub struct CreditConcentration;

impl Calculator for CreditConcentration {
    fn name(&self) -> &str {
        CREDIT_CONCENTRATION
    }

    fn dependencies(&self) -> &[&str] {
        &[TOTAL_ANNUAL_CREDITS]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Percentage
    }

    fn evaluate(&self, inputs: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        let total = resolved.number(TOTAL_ANNUAL_CREDITS);
        let largest = (1..=BANK_ACCOUNTS)
            .map(|account| account_total(inputs, account, Flow::Credit))
            .fold(0.0_f64, f64::max);
        DerivedValue::Number(safe_div(largest, total) * 100.0)
    }
}

/// Baseline of 100 reduced by capped volatility, trend, and concentration penalties.
pub struct CashFlowStabilityScore;

pub fn stability_score(volatility: f64, trend: f64, concentration: f64) -> f64 {
    let volatility_penalty = (volatility * 0.5).min(MAX_VOLATILITY_PENALTY);
    let trend_penalty = (trend.abs() * 0.5).min(MAX_TREND_PENALTY);
    let concentration_penalty =
        ((concentration - CONCENTRATION_TOLERANCE).max(0.0) * 0.6).min(MAX_CONCENTRATION_PENALTY);

    let score = 100.0 - volatility_penalty - trend_penalty - concentration_penalty;
    round_to(score.clamp(0.0, 100.0), 1)
}

impl Calculator for CashFlowStabilityScore {
    fn name(&self) -> &str {
        CASH_FLOW_STABILITY_SCORE
    }

    fn dependencies(&self) -> &[&str] {
        &[CREDIT_VOLATILITY_INDEX, CREDIT_TREND, CREDIT_CONCENTRATION]
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Score
    }

    fn evaluate(&self, _: &RawInputs, resolved: &ResolvedDependencies<'_>) -> DerivedValue {
        DerivedValue::Number(stability_score(
            resolved.number(CREDIT_VOLATILITY_INDEX),
            resolved.number(CREDIT_TREND),
            resolved.number(CREDIT_CONCENTRATION),
        ))
    }
}
