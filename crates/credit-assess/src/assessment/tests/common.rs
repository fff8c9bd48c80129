use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::calculators::cash_flow::{statement_key, Flow, STATEMENT_MONTHS};
use crate::assessment::calculators::loan::existing_emi_key;
use crate::assessment::domain::{DerivedValue, OutputFormat, RawInputs};
use crate::assessment::registry::FormulaFn;
use crate::assessment::scoring::Selections;
use crate::assessment::{AssessmentService, PolicyThresholds};

/// Calculator returning `value` that records how many times it ran.
pub(super) fn counting_calculator(
    name: &'static str,
    dependencies: &[&'static str],
    value: f64,
    calls: Arc<AtomicUsize>,
) -> FormulaFn {
    FormulaFn::new(name, dependencies, OutputFormat::Raw, move |_, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        DerivedValue::Number(value)
    })
}

/// Sums its declared dependencies.
pub(super) fn summing_calculator(name: &'static str, dependencies: &'static [&'static str]) -> FormulaFn {
    FormulaFn::new(name, dependencies, OutputFormat::Raw, move |_, resolved| {
        DerivedValue::Number(
            dependencies
                .iter()
                .map(|dependency| resolved.number(dependency))
                .sum(),
        )
    })
}

/// Trading business with steady bank credits split 70/20/10 across three accounts.
pub(super) fn sample_application() -> RawInputs {
    let mut inputs = RawInputs::new()
        .with("applicant_name", "Meridian Textiles")
        .with("applicant_age", 45.0)
        .with("gross_monthly_income", 150_000.0)
        .with("loan_amount", 500_000.0)
        .with("interest_rate", 10.5)
        .with("tenure_months", 60.0)
        .with("collateral_value", 800_000.0)
        .with("net_operating_income", 2_400_000.0)
        .with("current_assets", 600_000.0)
        .with("current_liabilities", 400_000.0)
        .with("trade_debtors", 45_000.0)
        .with("annual_sales", 365_000.0)
        .with("inventory", 40_000.0)
        .with("cost_of_goods_sold", 365_000.0)
        .with("trade_creditors", 30_000.0)
        .with("annual_purchases", 365_000.0)
        .with("cash_and_bank", 250_000.0)
        .with("property_value", 1_500_000.0)
        .with("outstanding_loans", "4,00,000")
        .with("net_sales_fy2", 3_000_000.0)
        .with("net_sales_fy3", 3_600_000.0)
        .with("net_profit_fy2", 300_000.0)
        .with("net_profit_fy3", 360_000.0);
    inputs.insert(existing_emi_key(1), 5_000.0);

    for month in 1..=STATEMENT_MONTHS {
        inputs.insert(statement_key(1, Flow::Credit, month), 70_000.0);
        inputs.insert(statement_key(2, Flow::Credit, month), 20_000.0);
        inputs.insert(statement_key(3, Flow::Credit, month), 10_000.0);
        inputs.insert(statement_key(1, Flow::Debit, month), 60_000.0);
    }

    inputs
}

/// Best option for every parameter of the standard scorecard.
pub(super) fn strongest_selections() -> Selections {
    [
        ("credit_bureau_score", "750 and above"),
        ("repayment_track_record", "No delays"),
        ("years_in_business", "More than 10 years"),
        ("debt_burden", "Below 30%"),
        ("collateral_coverage", "Above 150%"),
        ("cash_flow_stability", "Stable"),
        ("industry_outlook", "Positive"),
        ("management_quality", "Strong"),
    ]
    .into_iter()
    .map(|(name, label)| (name.to_string(), label.to_string()))
    .collect()
}

pub(super) fn standard_service() -> Arc<AssessmentService> {
    Arc::new(
        AssessmentService::standard(&PolicyThresholds::default())
            .expect("standard service builds"),
    )
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
