use crate::infra::build_service;
use chrono::{DateTime, Local};
use clap::Args;
use credit_assess::assessment::calculators::cash_flow::{statement_key, Flow, STATEMENT_MONTHS};
use credit_assess::assessment::calculators::loan::existing_emi_key;
use credit_assess::assessment::import::{load_inputs, load_selections};
use credit_assess::assessment::{
    AssessmentRequest, CalculatorFailure, RawInputs, RiskAssessment, Selections,
};
use credit_assess::config::AppConfig;
use credit_assess::error::AppError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DeriveArgs {
    /// Raw inputs as a JSON object or a Field,Value CSV export
    #[arg(long)]
    pub(crate) inputs: PathBuf,
    /// Print machine-readable JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON object mapping parameter names to selected option labels
    #[arg(long)]
    pub(crate) selections: PathBuf,
    /// Print machine-readable JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the full assessment report as JSON after the summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct DeriveOutput<'a> {
    generated_at: DateTime<Local>,
    display: &'a BTreeMap<String, String>,
    failures: &'a [CalculatorFailure],
}

pub(crate) fn run_derive(args: DeriveArgs) -> Result<(), AppError> {
    let service = build_service(&AppConfig::load()?)?;
    let inputs = load_inputs(&args.inputs)?;

    let report = service.derive(&inputs);
    let display = service.display_values(&report.snapshot);

    if args.json {
        print_json(&DeriveOutput {
            generated_at: Local::now(),
            display: &display,
            failures: &report.failures,
        });
    } else {
        println!(
            "Derived metrics for {} ({} inputs)",
            args.inputs.display(),
            inputs.len()
        );
        render_values(&display);
        render_failures(&report.failures);
    }

    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let service = build_service(&AppConfig::load()?)?;
    let selections = load_selections(&args.selections)?;

    let risk = service.score(&selections);

    if args.json {
        print_json(&risk);
    } else {
        render_risk(&risk);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = build_service(&AppConfig::load()?)?;
    let request = AssessmentRequest {
        inputs: demo_inputs(),
        selections: demo_selections(),
    };

    println!(
        "Credit assessment demo ({})",
        Local::now().format("%Y-%m-%d %H:%M")
    );
    println!(
        "- {} calculators registered | {} scorecard parameters",
        service.catalog().len(),
        service.scorecard().parameters.len()
    );

    let report = service.assess(&request);
    println!("\nDerived metrics");
    render_values(&report.display);
    render_failures(&report.failures);
    println!();
    render_risk(&report.risk);

    if args.json {
        print_json(&report);
    }

    Ok(())
}

fn render_values(display: &BTreeMap<String, String>) {
    let width = display.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in display {
        println!("  {name:<width$}  {value}");
    }
}

fn render_failures(failures: &[CalculatorFailure]) {
    if failures.is_empty() {
        return;
    }
    println!("Calculators not evaluated:");
    for failure in failures {
        println!("  - {}: {}", failure.calculator, failure.error);
    }
}

fn render_risk(risk: &RiskAssessment) {
    println!("Risk score {:.1} -> {}", risk.score, risk.band.name);
    println!("  {}", risk.band.description);
    for contribution in &risk.contributions {
        let selected = contribution.selected.as_deref().unwrap_or("(none)");
        let marker = if contribution.matched { "" } else { " [unmatched]" };
        println!(
            "  - {} ({:.0}%): {}{} -> {:.2}",
            contribution.parameter, contribution.weight, selected, marker, contribution.contribution
        );
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("JSON output unavailable: {err}"),
    }
}

/// Manufacturing borrower with steady receipts and one existing loan.
fn demo_inputs() -> RawInputs {
    let mut inputs = RawInputs::new()
        .with("applicant_name", "Kestrel Components")
        .with("applicant_age", 48.0)
        .with("income_business", 240_000.0)
        .with("income_rental", 35_000.0)
        .with("loan_amount", 2_500_000.0)
        .with("interest_rate", 11.25)
        .with("tenure_months", 84.0)
        .with("collateral_value", 3_600_000.0)
        .with("net_operating_income", 4_800_000.0)
        .with("current_assets", 3_100_000.0)
        .with("current_liabilities", 2_200_000.0)
        .with("trade_debtors", 1_150_000.0)
        .with("annual_sales", 9_800_000.0)
        .with("inventory", 900_000.0)
        .with("cost_of_goods_sold", 6_900_000.0)
        .with("trade_creditors", 780_000.0)
        .with("annual_purchases", 6_100_000.0)
        .with("cash_and_bank", 640_000.0)
        .with("property_value", 5_200_000.0)
        .with("vehicle_value", 450_000.0)
        .with("outstanding_loans", 1_300_000.0)
        .with("credit_card_dues", 60_000.0)
        .with("net_sales_fy1", 8_100_000.0)
        .with("net_sales_fy2", 8_900_000.0)
        .with("net_sales_fy3", 9_800_000.0)
        .with("net_profit_fy1", 520_000.0)
        .with("net_profit_fy2", 610_000.0)
        .with("net_profit_fy3", 700_000.0);
    inputs.insert(existing_emi_key(1), 18_500.0);

    let seasonal = [
        0.92, 0.88, 1.05, 1.10, 0.97, 0.94, 1.02, 1.08, 1.12, 0.99, 0.95, 0.98,
    ];
    for month in 1..=STATEMENT_MONTHS {
        let factor = seasonal[month - 1];
        inputs.insert(statement_key(1, Flow::Credit, month), 520_000.0 * factor);
        inputs.insert(statement_key(2, Flow::Credit, month), 230_000.0 * factor);
        inputs.insert(statement_key(3, Flow::Credit, month), 60_000.0);
        inputs.insert(statement_key(1, Flow::Debit, month), 610_000.0 * factor);
    }

    inputs
}

fn demo_selections() -> Selections {
    [
        ("credit_bureau_score", "700-749"),
        ("repayment_track_record", "No delays"),
        ("years_in_business", "More than 10 years"),
        ("debt_burden", "30-40%"),
        ("collateral_coverage", "125-150%"),
        ("cash_flow_stability", "Stable"),
        ("industry_outlook", "Neutral"),
        ("management_quality", "Adequate"),
    ]
    .into_iter()
    .map(|(name, label)| (name.to_string(), label.to_string()))
    .collect()
}
